//! Preorder directory traversal behind a small capability trait, so the
//! builder can be driven by the filesystem or by a synthetic tree.

use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// A directory is entered, before any of its children.
    EnterDir {
        depth: usize,
        name: OsString,
        /// Path relative to the walk root, `/`-separated; empty for the root.
        rel_path: Vec<u8>,
    },
    File {
        depth: usize,
        name: OsString,
    },
    /// Closes the most recently entered directory.
    LeaveDir,
}

/// Source of preorder traversal events.
pub trait TreeWalk {
    fn next_event(&mut self) -> Option<Result<WalkEvent>>;

    /// Skips the contents of the directory reported by the last `EnterDir`.
    /// Its `LeaveDir` is still delivered.
    fn skip_subtree(&mut self);
}

struct OpenDir {
    depth: usize,
    name_len: usize,
}

/// Filesystem walk over `walkdir`.
///
/// Inside each directory, files come before subdirectories and names are
/// sorted, which keeps a directory's files contiguous and builds reproducible.
/// Symlinks are not followed.
pub struct FsWalk {
    iter: walkdir::IntoIter,
    open: Vec<OpenDir>,
    rel_path: Vec<u8>,
    pending: Option<DirEntry>,
    last_was_dir: bool,
}

impl FsWalk {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let iter = WalkDir::new(root.as_ref())
            .follow_links(false)
            .sort_by(files_first)
            .into_iter();
        Self {
            iter,
            open: Vec::new(),
            rel_path: Vec::new(),
            pending: None,
            last_was_dir: false,
        }
    }

    fn leave(&mut self) -> WalkEvent {
        if let Some(dir) = self.open.pop() {
            let keep = self.rel_path.len().saturating_sub(dir.name_len);
            self.rel_path.truncate(keep);
            if self.rel_path.last() == Some(&b'/') {
                self.rel_path.pop();
            }
        }
        self.last_was_dir = false;
        WalkEvent::LeaveDir
    }

    fn enter(&mut self, entry: &DirEntry) -> WalkEvent {
        let name = entry.file_name().to_os_string();
        let depth = entry.depth();
        let mut name_len = 0;
        if depth > 0 {
            if !self.rel_path.is_empty() {
                self.rel_path.push(b'/');
            }
            let bytes = name.as_encoded_bytes();
            self.rel_path.extend_from_slice(bytes);
            name_len = bytes.len();
        }
        self.open.push(OpenDir { depth, name_len });
        self.last_was_dir = true;
        WalkEvent::EnterDir {
            depth,
            name,
            rel_path: self.rel_path.clone(),
        }
    }
}

impl TreeWalk for FsWalk {
    fn next_event(&mut self) -> Option<Result<WalkEvent>> {
        loop {
            let entry = match self.pending.take() {
                Some(entry) => entry,
                None => match self.iter.next() {
                    Some(Ok(entry)) => entry,
                    Some(Err(err)) => return Some(Err(err.into())),
                    None => {
                        if self.open.is_empty() {
                            return None;
                        }
                        return Some(Ok(self.leave()));
                    }
                },
            };

            if self
                .open
                .last()
                .is_some_and(|dir| entry.depth() <= dir.depth)
            {
                self.pending = Some(entry);
                return Some(Ok(self.leave()));
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                return Some(Ok(self.enter(&entry)));
            }
            if file_type.is_file() {
                self.last_was_dir = false;
                return Some(Ok(WalkEvent::File {
                    depth: entry.depth(),
                    name: entry.file_name().to_os_string(),
                }));
            }
            log::trace!("ignoring non-regular entry {}", entry.path().display());
        }
    }

    fn skip_subtree(&mut self) {
        // walkdir's skip pops whatever directory was yielded last, which is
        // the parent when the last entry was a file.
        if self.last_was_dir {
            self.iter.skip_current_dir();
            self.last_was_dir = false;
        }
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// In-memory tree for driving the builder without touching the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    events: Vec<WalkEvent>,
    cursor: usize,
}

impl MemoryTree {
    /// Builds a tree from `/`-separated file paths; directories are implied.
    /// Children are ordered the same way `FsWalk` orders them.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        #[derive(Default)]
        struct Node {
            files: std::collections::BTreeSet<String>,
            dirs: std::collections::BTreeMap<String, Node>,
        }

        fn emit(node: &Node, depth: usize, name: &str, rel: &str, out: &mut Vec<WalkEvent>) {
            out.push(WalkEvent::EnterDir {
                depth,
                name: OsString::from(name),
                rel_path: rel.as_bytes().to_vec(),
            });
            for file in &node.files {
                out.push(WalkEvent::File {
                    depth: depth + 1,
                    name: OsString::from(file),
                });
            }
            for (child, sub) in &node.dirs {
                let child_rel = if rel.is_empty() {
                    child.clone()
                } else {
                    format!("{rel}/{child}")
                };
                emit(sub, depth + 1, child, &child_rel, out);
            }
            out.push(WalkEvent::LeaveDir);
        }

        let mut root = Node::default();
        for path in paths {
            let mut parts: Vec<&str> = path
                .as_ref()
                .split('/')
                .filter(|p| !p.is_empty())
                .collect();
            let Some(file) = parts.pop() else {
                continue;
            };
            let mut node = &mut root;
            for part in parts {
                node = node.dirs.entry(part.to_string()).or_default();
            }
            node.files.insert(file.to_string());
        }

        let mut events = Vec::new();
        emit(&root, 0, ".", "", &mut events);
        Self { events, cursor: 0 }
    }
}

impl TreeWalk for MemoryTree {
    fn next_event(&mut self) -> Option<Result<WalkEvent>> {
        let event = self.events.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Ok(event))
    }

    fn skip_subtree(&mut self) {
        let Some(WalkEvent::EnterDir { .. }) = self.cursor.checked_sub(1).and_then(|i| self.events.get(i)) else {
            return;
        };
        let mut open = 1usize;
        while let Some(event) = self.events.get(self.cursor) {
            match event {
                WalkEvent::EnterDir { .. } => open += 1,
                WalkEvent::LeaveDir => {
                    open -= 1;
                    if open == 0 {
                        // leave the matching LeaveDir to be delivered
                        return;
                    }
                }
                WalkEvent::File { .. } => {}
            }
            self.cursor += 1;
        }
    }
}
