//! Candidate enumeration: the deterministic, totally ordered pair sequence a
//! batch window indexes into. Identical parameters against an unchanged
//! corpus must reproduce identical pairs, since disjoint batch windows of the
//! same sequence run as independent processes.

use crate::error::ConfigError;
use crate::models::{Candidate, TableRef};

pub struct CandidateSequence {
    pairs: Vec<(TableRef, TableRef)>,
}

impl CandidateSequence {
    /// Length-1 sequence from explicit identifiers (single-pair mode).
    pub fn single(left: TableRef, right: TableRef) -> Self {
        Self {
            pairs: vec![(left, right)],
        }
    }

    /// All unordered pairs of one day: (i, j) with 0 <= i < j < n, in
    /// lexicographic order. No self pairs.
    pub fn same_day(n: usize, day: &str) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::EmptyCorpus {
                day: day.to_string(),
            });
        }
        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((TableRef::dated(i, day), TableRef::dated(j, day)));
            }
        }
        Ok(Self { pairs })
    }

    /// All ordered pairs across two days: (i, j) with 0 <= i, j < n,
    /// self pairs included, lexicographic order. A source compared against
    /// its own next-day scrape is exactly the interesting case here.
    pub fn cross_day(n: usize, day: &str, day2: &str) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::EmptyCorpus {
                day: day.to_string(),
            });
        }
        let mut pairs = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                pairs.push((TableRef::dated(i, day), TableRef::dated(j, day2)));
            }
        }
        Ok(Self { pairs })
    }

    /// Sequence from an externally supplied pair set. The set has no order of
    /// its own, so it is sorted lexicographically by (left, right) before
    /// indexing; without that, batch windows would not be reproducible.
    pub fn from_pair_set(mut pairs: Vec<(String, String)>) -> Self {
        pairs.sort();
        Self {
            pairs: pairs
                .into_iter()
                .map(|(l, r)| (TableRef::snapshot(&l), TableRef::snapshot(&r)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Validate a batch window and return its candidates with their global
    /// sequence indices.
    pub fn window(
        &self,
        first_id: usize,
        num_cand: usize,
    ) -> Result<Vec<Candidate>, ConfigError> {
        let end = first_id.checked_add(num_cand).filter(|&e| e <= self.len());
        let end = end.ok_or(ConfigError::WindowOutOfRange {
            first_id,
            num_cand,
            len: self.len(),
        })?;
        Ok(self.pairs[first_id..end]
            .iter()
            .enumerate()
            .map(|(offset, (left, right))| Candidate {
                index: first_id + offset,
                left: left.clone(),
                right: right.clone(),
            })
            .collect())
    }
}
