//! Generic message validation
//!
//! Checks every backend shares. Backend-specific checks (payload and
//! accumulator shape) live in [`crate::backend`].

use super::SmId;
use std::collections::BTreeSet;

/// Why an inbound message was discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Payload could not be decoded")]
    Malformed,

    #[error("Unexpected {0} message")]
    UnexpectedKind(&'static str),

    #[error("Wrong round: expected {expected}, got {actual}")]
    WrongRound { expected: u64, actual: u64 },

    #[error("Unknown endpoint id {0}")]
    UnknownEndpoint(SmId),

    #[error("Duplicate contribution from endpoint {0}")]
    Duplicate(SmId),

    #[error("l_rem and l_act overlap")]
    Overlap,

    #[error("Endpoint {0} is not in l_rem")]
    NotSelected(SmId),

    #[error("Endpoint {0} already acted")]
    AlreadyActed(SmId),

    #[error("Endpoint {0} did not contribute in phase 1")]
    NotContributed(SmId),

    #[error("Only {got} endpoints acted, quorum is {n_min}")]
    BelowQuorum { got: usize, n_min: usize },

    #[error("Payload does not match the backend: {0}")]
    Payload(String),
}

/// Message round must equal the receiver's round.
pub fn check_round(expected: u64, actual: u64) -> Result<(), Rejection> {
    if expected != actual {
        return Err(Rejection::WrongRound { expected, actual });
    }
    Ok(())
}

/// Every id must be in `0..n`.
pub fn check_ids<'a>(ids: impl IntoIterator<Item = &'a SmId>, n: usize) -> Result<(), Rejection> {
    match ids.into_iter().find(|id| **id >= n) {
        Some(id) => Err(Rejection::UnknownEndpoint(*id)),
        None => Ok(()),
    }
}

/// Activation as seen by endpoint `own_id`.
pub fn check_activation(
    own_id: SmId,
    n: usize,
    l_rem: &BTreeSet<SmId>,
    l_act: &BTreeSet<SmId>,
) -> Result<(), Rejection> {
    if !l_rem.is_disjoint(l_act) {
        return Err(Rejection::Overlap);
    }
    check_ids(l_rem, n)?;
    check_ids(l_act, n)?;
    if l_act.contains(&own_id) {
        return Err(Rejection::AlreadyActed(own_id));
    }
    if !l_rem.contains(&own_id) {
        return Err(Rejection::NotSelected(own_id));
    }
    Ok(())
}

/// Phase 2 result as seen by the DC. Every acted endpoint must have
/// contributed in phase 1 and there must be at least `n_min` of them.
pub fn check_result(
    n: usize,
    n_min: usize,
    contributors: &BTreeSet<SmId>,
    l_act: &BTreeSet<SmId>,
) -> Result<(), Rejection> {
    check_ids(l_act, n)?;
    if let Some(id) = l_act.difference(contributors).next() {
        return Err(Rejection::NotContributed(*id));
    }
    if l_act.len() < n_min {
        return Err(Rejection::BelowQuorum {
            got: l_act.len(),
            n_min,
        });
    }
    Ok(())
}
