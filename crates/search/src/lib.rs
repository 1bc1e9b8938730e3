//! Keystroke-speed fuzzy ranking over a pathseek index.
//!
//! Every query is a full linear scan: each file entry is scored by
//! [`score`] and offered to a fixed-capacity [`CandidateList`].

mod candidates;
mod error;
mod matcher;
mod session;

pub use candidates::{Candidate, CandidateList};
pub use error::{Result, SearchError};
pub use matcher::{score, Goodness};
pub use session::{search, search_into, AdmissionPolicy, ScanStats, SearchSession};
