use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("candidate list capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
}
