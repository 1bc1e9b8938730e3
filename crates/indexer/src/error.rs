use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("arena exhausted: {requested} bytes requested, limit is {limit} bytes")]
    AllocationExhausted { requested: usize, limit: usize },

    #[error("invalid arena configuration: {0}")]
    InvalidArenaConfig(String),

    #[error("traversal failed at {}: {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid root path: {0}")]
    InvalidRoot(String),

    #[error("index build cancelled")]
    Cancelled,
}

impl From<walkdir::Error> for IndexerError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        IndexerError::Traversal {
            path,
            source: std::io::Error::from(err),
        }
    }
}
