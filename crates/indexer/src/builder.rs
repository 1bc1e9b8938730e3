use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use pathseek_protocol::AcceptName;

use crate::arena::{Arena, ArenaConfig};
use crate::error::{IndexerError, Result};
use crate::index::Index;
use crate::layout::{write_record, write_terminator};
use crate::stats::IndexStats;
use crate::walk::{FsWalk, TreeWalk, WalkEvent};

const HIDDEN_MARKER: u8 = b'.';

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub arena: ArenaConfig,
    /// Checked once per directory; setting it aborts the build with
    /// [`IndexerError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Walks a tree once and packs every accepted file into an [`Index`].
pub struct IndexBuilder<F> {
    root: PathBuf,
    filter: F,
    options: BuildOptions,
}

struct OpenDir {
    seq: u64,
    rel_path: Vec<u8>,
}

impl<F: AcceptName> IndexBuilder<F> {
    pub fn new(root: impl AsRef<Path>, filter: F) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            filter,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds from the filesystem under the root.
    pub fn build(self) -> Result<Index> {
        let meta = std::fs::metadata(&self.root).map_err(|source| IndexerError::Traversal {
            path: self.root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(IndexerError::InvalidRoot(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let walk = FsWalk::new(&self.root);
        self.build_from(walk)
    }

    /// Builds from any traversal source. Fails without a partial index on
    /// the first traversal or allocation error.
    pub fn build_from<W: TreeWalk>(self, mut walk: W) -> Result<Index> {
        let started = Instant::now();
        let mut arena = Arena::new(self.options.arena)?;
        let files_start = arena.next_offset();
        let mut stats = IndexStats::new();

        let mut dirs: Vec<OpenDir> = Vec::new();
        let mut next_seq = 0u64;
        // Directory whose group header was written last and is not yet terminated.
        let mut open_group: Option<u64> = None;

        while let Some(event) = walk.next_event() {
            match event? {
                WalkEvent::EnterDir {
                    depth,
                    name,
                    rel_path,
                } => {
                    self.check_cancelled()?;
                    if depth > 0 && is_hidden(&name) {
                        stats.hidden += 1;
                        walk.skip_subtree();
                    } else {
                        stats.directories += 1;
                    }
                    dirs.push(OpenDir {
                        seq: next_seq,
                        rel_path,
                    });
                    next_seq += 1;
                }
                WalkEvent::File { depth, name } => {
                    if depth > 0 && is_hidden(&name) {
                        stats.hidden += 1;
                        continue;
                    }
                    if !self.filter.accepts(&name) {
                        stats.rejected += 1;
                        continue;
                    }
                    let Some(dir) = dirs.last() else {
                        return Err(IndexerError::InvalidRoot(format!(
                            "file {} reported outside any directory",
                            name.to_string_lossy()
                        )));
                    };
                    if open_group != Some(dir.seq) {
                        if open_group.is_some() {
                            write_terminator(&mut arena)?;
                        }
                        log::debug!("group {}", String::from_utf8_lossy(&dir.rel_path));
                        write_record(&mut arena, &dir.rel_path)?;
                        stats.groups += 1;
                        open_group = Some(dir.seq);
                    }
                    write_record(&mut arena, name.as_encoded_bytes())?;
                    stats.files += 1;
                }
                WalkEvent::LeaveDir => {
                    dirs.pop();
                }
            }
        }
        if open_group.is_some() {
            write_terminator(&mut arena)?;
        }

        let files_end = arena.next_offset();
        stats.bytes = files_end - files_start;
        stats.time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Indexed {} files in {} directories under {} ({} bytes, {} ms)",
            stats.files,
            stats.groups,
            self.root.display(),
            stats.bytes,
            stats.time_ms
        );

        let bytes = arena.freeze();
        Ok(Index::new(self.root, bytes, files_start..files_end, stats))
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.options.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(IndexerError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Builds an index of `root` keeping the files `filter` accepts.
pub fn build(root: impl AsRef<Path>, filter: impl AcceptName) -> Result<Index> {
    IndexBuilder::new(root, filter).build()
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&HIDDEN_MARKER)
}
