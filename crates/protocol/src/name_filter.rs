use std::ffi::OsStr;
use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Decides whether a file's base name qualifies for the index.
pub trait AcceptName {
    fn accepts(&self, name: &OsStr) -> bool;
}

impl<F> AcceptName for F
where
    F: Fn(&OsStr) -> bool,
{
    fn accepts(&self, name: &OsStr) -> bool {
        self(name)
    }
}

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Shell-glob filter over base names.
///
/// A non-empty include list wins outright: a name is accepted iff it matches
/// one of the include patterns and the exclude list is never consulted.
/// Otherwise a name is rejected iff it matches an exclude pattern.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl NameFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Filter that accepts every name.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }
}

impl AcceptName for NameFilter {
    fn accepts(&self, name: &OsStr) -> bool {
        let name = Path::new(name);
        if let Some(include) = &self.include {
            return include.is_match(name);
        }
        if let Some(exclude) = &self.exclude {
            return !exclude.is_match(name);
        }
        true
    }
}

fn compile(patterns: &[String]) -> Result<Option<GlobSet>, FilterError> {
    let patterns: Vec<&str> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &patterns {
        builder.add(glob(pattern)?);
    }
    let set = builder.build().map_err(|source| FilterError::InvalidPattern {
        pattern: patterns.join(","),
        source,
    })?;
    Ok(Some(set))
}

fn glob(pattern: &str) -> Result<Glob, FilterError> {
    // fnmatch(3) without flags: `*` never crosses a separator, and base names have none anyway.
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn accepts(filter: &NameFilter, name: &str) -> bool {
        filter.accepts(OsStr::new(name))
    }

    #[test]
    fn no_patterns_accepts_everything() {
        let filter = NameFilter::new(&[], &[]).unwrap();
        assert!(!filter.is_active());
        assert!(accepts(&filter, "main.c"));
        assert!(accepts(&filter, "readme.md"));
    }

    #[test]
    fn include_list_requires_a_match() {
        let filter = NameFilter::new(&names(&["*.c", "*.h"]), &[]).unwrap();
        assert!(accepts(&filter, "main.c"));
        assert!(accepts(&filter, "util.h"));
        assert!(!accepts(&filter, "readme.md"));
        assert!(!accepts(&filter, "main.cpp"));
    }

    #[test]
    fn include_list_ignores_excludes() {
        let filter = NameFilter::new(&names(&["*.c"]), &names(&["main.*"])).unwrap();
        assert!(accepts(&filter, "main.c"));
    }

    #[test]
    fn exclude_list_rejects_matches() {
        let filter = NameFilter::new(&[], &names(&["*.o", "*.ppm"])).unwrap();
        assert!(!accepts(&filter, "main.o"));
        assert!(!accepts(&filter, "image.ppm"));
        assert!(accepts(&filter, "main.c"));
    }

    #[test]
    fn blank_patterns_do_not_activate_filter() {
        let filter = NameFilter::new(&names(&["", "  "]), &names(&[""])).unwrap();
        assert!(!filter.is_active());
        assert!(accepts(&filter, "anything"));
    }

    #[test]
    fn bracket_classes_and_single_char_wildcards() {
        let filter = NameFilter::new(&names(&["?.[ch]"]), &[]).unwrap();
        assert!(accepts(&filter, "a.c"));
        assert!(accepts(&filter, "b.h"));
        assert!(!accepts(&filter, "ab.c"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = NameFilter::new(&names(&["[unclosed"]), &[]).unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn closures_act_as_filters() {
        let only_rs = |name: &OsStr| name.to_string_lossy().ends_with(".rs");
        assert!(only_rs.accepts(OsStr::new("lib.rs")));
        assert!(!only_rs.accepts(OsStr::new("lib.c")));
    }
}
