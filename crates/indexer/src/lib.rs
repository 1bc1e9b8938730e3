//! # Pathseek Indexer
//!
//! Builds the packed, read-only path index that the search engine scans on
//! every keystroke.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> TreeWalk (preorder, hidden entries pruned)
//!     │      └─> enter / file / leave events
//!     │
//!     ├──> AcceptName filter
//!     │      └─> accepted base names
//!     │
//!     └──> Arena (bump allocated, packed layout)
//!            └─> frozen Index
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pathseek_indexer::build;
//! use pathseek_protocol::NameFilter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let filter = NameFilter::new(&["*.rs".to_string()], &[])?;
//!     let index = build("/path/to/project", filter)?;
//!
//!     for entry in index.entries() {
//!         println!(
//!             "{}/{}",
//!             String::from_utf8_lossy(entry.dirname),
//!             String::from_utf8_lossy(entry.filename)
//!         );
//!     }
//!     Ok(())
//! }
//! ```

mod arena;
mod builder;
mod error;
mod index;
mod layout;
mod stats;
mod walk;

pub use arena::{Arena, ArenaConfig, MIB};
pub use builder::{build, BuildOptions, IndexBuilder};
pub use error::{IndexerError, Result};
pub use index::{DirectoryGroup, Entries, Groups, Index, IndexEntry};
pub use layout::{GROUP_TERMINATOR, LEN_SIZE};
pub use stats::IndexStats;
pub use walk::{FsWalk, MemoryTree, TreeWalk, WalkEvent};
