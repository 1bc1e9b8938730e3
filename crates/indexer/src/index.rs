use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::layout::{Reader, GROUP_TERMINATOR, LEN_SIZE};
use crate::stats::IndexStats;

/// Frozen, read-only packed snapshot of a filtered directory tree.
///
/// Built once by [`IndexBuilder`](crate::IndexBuilder); the bytes never move
/// or change afterwards, so views borrowed from it stay valid for its
/// lifetime and it can be searched from several threads at once.
#[derive(Debug)]
pub struct Index {
    root: PathBuf,
    bytes: Box<[u8]>,
    files: Range<usize>,
    stats: IndexStats,
}

/// One file entry with the directory it belongs to. Both strings borrow
/// from the index and exclude the NUL terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry<'a> {
    pub dirname: &'a [u8],
    pub filename: &'a [u8],
}

impl Index {
    pub(crate) fn new(
        root: PathBuf,
        bytes: Box<[u8]>,
        files: Range<usize>,
        stats: IndexStats,
    ) -> Self {
        Self {
            root,
            bytes,
            files,
            stats,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// The packed `[files_start, files_end)` region.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.files.clone()]
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of file entries.
    pub fn len(&self) -> usize {
        self.stats.files
    }

    /// File entries in scan order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            reader: Reader::new(self.as_bytes()),
            dirname: None,
        }
    }

    pub fn groups(&self) -> Groups<'_> {
        Groups {
            reader: Reader::new(self.as_bytes()),
        }
    }
}

pub struct Entries<'a> {
    reader: Reader<'a>,
    dirname: Option<&'a [u8]>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = IndexEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let dirname = match self.dirname {
                Some(dirname) => dirname,
                None => {
                    let len = self.reader.read_len()?;
                    let dirname = self.reader.read_str(len)?;
                    self.dirname = Some(dirname);
                    dirname
                }
            };

            let len = self.reader.read_len()?;
            if len == GROUP_TERMINATOR {
                self.dirname = None;
                continue;
            }
            let filename = self.reader.read_str(len)?;
            return Some(IndexEntry { dirname, filename });
        }
    }
}

/// One directory's slice of the index.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryGroup<'a> {
    pub dirname: &'a [u8],
    body: &'a [u8],
}

impl<'a> DirectoryGroup<'a> {
    pub fn files(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let mut reader = Reader::new(self.body);
        std::iter::from_fn(move || {
            let len = reader.read_len()?;
            reader.read_str(len)
        })
    }
}

pub struct Groups<'a> {
    reader: Reader<'a>,
}

impl<'a> Iterator for Groups<'a> {
    type Item = DirectoryGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.reader.read_len()?;
        let dirname = self.reader.read_str(len)?;

        let start = self.reader.position();
        loop {
            let len = self.reader.read_len()?;
            if len == GROUP_TERMINATOR {
                break;
            }
            self.reader.read_str(len)?;
        }
        let end = self.reader.position() - LEN_SIZE;
        let body = self.reader.slice(start, end);
        Some(DirectoryGroup { dirname, body })
    }
}

#[cfg(test)]
mod tests {
    use crate::walk::MemoryTree;
    use crate::IndexBuilder;
    use pretty_assertions::assert_eq;
    use std::ffi::OsStr;

    fn accept_all(_: &OsStr) -> bool {
        true
    }

    #[test]
    fn entries_carry_their_directory() {
        let tree = MemoryTree::from_paths(["a/x.c", "a/y.c", "b/c/z.c"]);
        let index = IndexBuilder::new("root", accept_all)
            .build_from(tree)
            .unwrap();

        let pairs: Vec<(&[u8], &[u8])> = index
            .entries()
            .map(|entry| (entry.dirname, entry.filename))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (&b"a"[..], &b"x.c"[..]),
                (&b"a"[..], &b"y.c"[..]),
                (&b"b/c"[..], &b"z.c"[..]),
            ]
        );
    }

    #[test]
    fn empty_tree_gives_empty_index() {
        let index = IndexBuilder::new("root", accept_all)
            .build_from(MemoryTree::from_paths(Vec::<String>::new()))
            .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.entries().count(), 0);
        assert_eq!(index.groups().count(), 0);
    }

    #[test]
    fn index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<super::Index>();
    }
}
