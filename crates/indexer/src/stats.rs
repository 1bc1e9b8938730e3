use serde::{Deserialize, Serialize};

/// Statistics about one index build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Directories entered (pruned hidden ones excluded)
    pub directories: usize,

    /// Directory groups written to the index
    pub groups: usize,

    /// Files accepted by the filter
    pub files: usize,

    /// Files rejected by the filter
    pub rejected: usize,

    /// Hidden files and directories pruned below the root
    pub hidden: usize,

    /// Size of the packed region
    pub bytes: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }
}
