use pathseek_protocol::MatchRecord;

use crate::error::{Result, SearchError};
use crate::matcher::Goodness;

/// A ranked path borrowed from the index it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub dirname: &'a [u8],
    pub filename: &'a [u8],
    pub goodness: Goodness,
}

impl Candidate<'_> {
    pub fn to_record(&self) -> MatchRecord {
        MatchRecord::new(self.dirname, self.filename, self.goodness)
    }
}

/// Fixed-capacity top-K list kept sorted from best to worst.
///
/// All K slots exist from construction on and are recycled across queries.
/// An unranked slot (`None`) sorts below every real score, and unranked slots
/// always trail the ranked ones. Among equal scores the most recently added
/// candidate ranks first.
#[derive(Debug, Clone)]
pub struct CandidateList<'a> {
    slots: Vec<Option<Candidate<'a>>>,
}

impl<'a> CandidateList<'a> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SearchError::InvalidCapacity(capacity));
        }
        Ok(Self {
            slots: vec![None; capacity],
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Marks every slot unranked without reallocating.
    pub fn reset(&mut self) {
        self.slots.fill(None);
    }

    /// Goodness of the worst slot, `None` while any slot is unranked.
    pub fn worst_goodness(&self) -> Option<Goodness> {
        self.slots.last().copied().flatten().map(|c| c.goodness)
    }

    /// Offers a candidate. Returns `false` and leaves the list untouched when
    /// `goodness` is below the current worst slot.
    ///
    /// Otherwise the worst slot is recycled for the new candidate, which is
    /// placed in front of the first slot scoring no more than it does.
    pub fn add(&mut self, dirname: &'a [u8], filename: &'a [u8], goodness: Goodness) -> bool {
        if self.worst_goodness().is_some_and(|worst| goodness < worst) {
            return false;
        }

        self.slots.pop();
        let at = self
            .slots
            .iter()
            .position(|slot| slot.map_or(true, |c| c.goodness <= goodness))
            .unwrap_or(self.slots.len());
        self.slots.insert(
            at,
            Some(Candidate {
                dirname,
                filename,
                goodness,
            }),
        );
        true
    }

    /// Ranked candidates, best first. Unranked slots are never yielded.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate<'a>> + '_ {
        self.slots.iter().map_while(Option::as_ref)
    }

    /// Number of ranked slots.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.best().is_none()
    }

    pub fn best(&self) -> Option<&Candidate<'a>> {
        self.slots.first().and_then(Option::as_ref)
    }

    /// Every slot including unranked ones, best to worst.
    pub fn slots(&self) -> &[Option<Candidate<'a>>] {
        &self.slots
    }

    pub fn to_records(&self) -> Vec<MatchRecord> {
        self.iter().map(Candidate::to_record).collect()
    }
}
