//! Chain activation
//!
//! The running accumulator is handed from endpoint to endpoint in ascending
//! id order. An endpoint that cannot be reached is dropped from `l_rem` and
//! the next one is tried, so a single pass over `l_rem` bounds the work.
//!
//! ```text
//! l_rem = {0, 1, 2}, l_act = {}      DC activates 0
//! l_rem = {1, 2},    l_act = {0}     0 → 1 fails, skip 1
//! l_rem = {2},       l_act = {0}     0 → 2 succeeds
//! l_rem = {},        l_act = {0, 2}  2 is last, reports to DC
//! ```

use super::SmId;
use std::collections::BTreeSet;

/// Snapshot of `l_rem` / `l_act` held by the active endpoint.
///
/// `l_rem` and `l_act` stay disjoint: ids only ever move from the first to
/// the second or leave `l_rem` altogether.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    n_min: usize,
    l_rem: BTreeSet<SmId>,
    l_act: BTreeSet<SmId>,
}

impl Chain {
    /// Build from a received activation. Ids present in both sets are kept
    /// only in `l_act`.
    pub fn new(n_min: usize, l_rem: BTreeSet<SmId>, l_act: BTreeSet<SmId>) -> Self {
        let l_rem = l_rem.difference(&l_act).copied().collect();
        Self {
            n_min,
            l_rem,
            l_act,
        }
    }

    /// Move `id` from `l_rem` to `l_act`.
    pub fn activate(&mut self, id: SmId) {
        self.l_rem.remove(&id);
        self.l_act.insert(id);
    }

    /// Drop an unreachable candidate.
    pub fn skip(&mut self, id: SmId) {
        self.l_rem.remove(&id);
    }

    /// Nobody left to forward to, or not enough endpoints left to ever
    /// reach the quorum.
    pub fn is_last(&self) -> bool {
        self.l_rem.is_empty() || self.l_rem.len() + self.l_act.len() < self.n_min
    }

    /// Smallest remaining id.
    pub fn next_candidate(&self) -> Option<SmId> {
        self.l_rem.first().copied()
    }

    /// Enough endpoints folded in to reveal an aggregate.
    pub fn reached_quorum(&self) -> bool {
        self.l_act.len() >= self.n_min
    }

    pub fn l_rem(&self) -> &BTreeSet<SmId> {
        &self.l_rem
    }

    pub fn l_act(&self) -> &BTreeSet<SmId> {
        &self.l_act
    }
}
