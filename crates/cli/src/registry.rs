use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use lru::LruCache;
use pathseek_indexer::Index;

pub const DEFAULT_REGISTRY_CAPACITY: usize = 5;

/// Built indexes keyed by canonical root, evicting the least recently used
/// once `capacity` roots are held.
pub struct IndexRegistry<B> {
    indexes: LruCache<PathBuf, Index>,
    build: B,
}

impl<B> IndexRegistry<B>
where
    B: FnMut(&Path) -> Result<Index>,
{
    pub fn new(capacity: usize, build: B) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            indexes: LruCache::new(capacity),
            build,
        }
    }

    pub fn get_or_build(&mut self, root: &Path) -> Result<&Index> {
        let key = canonical(root)?;
        if !self.indexes.contains(&key) {
            let index = (self.build)(&key)?;
            if let Some((evicted, _)) = self.indexes.push(key.clone(), index) {
                log::debug!("Evicted index for {}", evicted.display());
            }
        }
        self.indexes
            .get(&key)
            .ok_or_else(|| anyhow!("index for {} vanished", key.display()))
    }

    /// Drops any cached index for `root` and builds it again.
    pub fn rescan(&mut self, root: &Path) -> Result<&Index> {
        let key = canonical(root)?;
        if self.indexes.pop(&key).is_some() {
            log::info!("Rescanning {}", key.display());
        }
        self.get_or_build(&key)
    }

    pub fn contains(&self, root: &Path) -> bool {
        canonical(root).is_ok_and(|key| self.indexes.contains(&key))
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }
}

fn canonical(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("Cannot resolve root {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathseek_indexer::IndexBuilder;
    use std::cell::Cell;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::tempdir;

    fn accept_all(_: &OsStr) -> bool {
        true
    }

    #[test]
    fn reuses_built_indexes_and_evicts_lru() {
        let temp = tempdir().unwrap();
        let roots: Vec<PathBuf> = (0..3)
            .map(|i| {
                let root = temp.path().join(format!("p{i}"));
                fs::create_dir_all(&root).unwrap();
                fs::write(root.join("file.c"), b"").unwrap();
                root
            })
            .collect();

        let builds = Cell::new(0);
        let mut registry = IndexRegistry::new(2, |root: &Path| {
            builds.set(builds.get() + 1);
            Ok(IndexBuilder::new(root, accept_all).build()?)
        });

        registry.get_or_build(&roots[0]).unwrap();
        registry.get_or_build(&roots[1]).unwrap();
        registry.get_or_build(&roots[0]).unwrap();
        assert_eq!(builds.get(), 2);

        // p1 is now least recently used.
        registry.get_or_build(&roots[2]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&roots[0]));
        assert!(!registry.contains(&roots[1]));
        assert!(registry.contains(&roots[2]));
    }

    #[test]
    fn rescan_picks_up_new_files() {
        let temp = tempdir().unwrap();
        let root = temp.path().to_path_buf();
        fs::write(root.join("a.c"), b"").unwrap();

        let mut registry = IndexRegistry::new(DEFAULT_REGISTRY_CAPACITY, |root: &Path| {
            Ok(IndexBuilder::new(root, accept_all).build()?)
        });
        assert_eq!(registry.get_or_build(&root).unwrap().len(), 1);

        fs::write(root.join("b.c"), b"").unwrap();
        assert_eq!(registry.get_or_build(&root).unwrap().len(), 1);
        assert_eq!(registry.rescan(&root).unwrap().len(), 2);
    }

    #[test]
    fn build_errors_propagate() {
        let temp = tempdir().unwrap();
        let mut registry =
            IndexRegistry::new(1, |_: &Path| -> Result<Index> { Err(anyhow!("boom")) });
        assert!(registry.get_or_build(temp.path()).is_err());
        assert!(registry.get_or_build(&temp.path().join("missing")).is_err());
        assert_eq!(registry.len(), 0);
    }
}
