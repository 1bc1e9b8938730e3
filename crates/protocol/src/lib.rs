//! Contracts shared between the pathseek indexer, search engine and CLI.

use serde::{Deserialize, Serialize};

pub mod name_filter;

pub use name_filter::{AcceptName, FilterError, NameFilter};

/// One ranked search hit, detached from the index it came from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// `dirname/filename`, or just the file name for files in the root.
    pub path: String,
    pub dirname: String,
    pub filename: String,
    pub goodness: u32,
}

impl MatchRecord {
    pub fn new(dirname: &[u8], filename: &[u8], goodness: u32) -> Self {
        let dirname = String::from_utf8_lossy(dirname).into_owned();
        let filename = String::from_utf8_lossy(filename).into_owned();
        let path = join_path(&dirname, &filename);
        Self {
            path,
            dirname,
            filename,
            goodness,
        }
    }
}

pub fn join_path(dirname: &str, filename: &str) -> String {
    if dirname.is_empty() {
        filename.to_string()
    } else {
        format!("{dirname}/{filename}")
    }
}
