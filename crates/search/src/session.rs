use pathseek_indexer::Index;
use pathseek_protocol::MatchRecord;
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateList;
use crate::error::Result;
use crate::matcher::{score, Goodness};

/// Which scored matches a scan offers to the candidate list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Offer a match only if it scores at least as well as the last match
    /// offered in this scan. The floor never drops, so a weaker match found
    /// after a stronger one is skipped even while slots are still unranked.
    /// This reproduces the established ranking; see `All` for plain top-K.
    #[default]
    MonotonicFloor,
    /// Offer every match; the list keeps the best K.
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned: usize,
    pub matched: usize,
    pub offered: usize,
}

/// Re-ranks `index` against `query` into `list`.
///
/// The list is reset first and the whole index is scanned; this never fails.
pub fn search_into<'a>(
    index: &'a Index,
    query: &[u8],
    admission: AdmissionPolicy,
    list: &mut CandidateList<'a>,
) -> ScanStats {
    list.reset();
    let mut stats = ScanStats::default();
    let mut floor: Option<Goodness> = None;

    for entry in index.entries() {
        stats.scanned += 1;
        let Some(goodness) = score(entry.dirname, entry.filename, query) else {
            continue;
        };
        stats.matched += 1;

        if admission == AdmissionPolicy::MonotonicFloor
            && floor.is_some_and(|floor| goodness < floor)
        {
            continue;
        }
        floor = Some(goodness);
        list.add(entry.dirname, entry.filename, goodness);
        stats.offered += 1;
    }

    log::debug!(
        "query {:?}: scanned {}, matched {}, offered {}",
        String::from_utf8_lossy(query),
        stats.scanned,
        stats.matched,
        stats.offered
    );
    stats
}

/// One-shot search returning owned records.
pub fn search(index: &Index, query: &[u8], limit: usize) -> Result<Vec<MatchRecord>> {
    let mut list = CandidateList::new(limit)?;
    search_into(index, query, AdmissionPolicy::default(), &mut list);
    Ok(list.to_records())
}

/// Reusable query context over one index.
///
/// Owns its candidate list so repeated searches (one per keystroke) recycle
/// the same K slots. Several sessions may share one index.
pub struct SearchSession<'a> {
    index: &'a Index,
    candidates: CandidateList<'a>,
    admission: AdmissionPolicy,
    last_scan: ScanStats,
}

impl<'a> SearchSession<'a> {
    pub fn new(index: &'a Index, limit: usize) -> Result<Self> {
        Ok(Self {
            index,
            candidates: CandidateList::new(limit)?,
            admission: AdmissionPolicy::default(),
            last_scan: ScanStats::default(),
        })
    }

    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.admission = admission;
        self
    }

    pub fn search(&mut self, query: &[u8]) -> &CandidateList<'a> {
        self.last_scan = search_into(self.index, query, self.admission, &mut self.candidates);
        &self.candidates
    }

    pub fn candidates(&self) -> &CandidateList<'a> {
        &self.candidates
    }

    pub fn last_scan(&self) -> ScanStats {
        self.last_scan
    }

    pub fn index(&self) -> &'a Index {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.candidates.capacity()
    }
}
