//! Per-round state
//!
//! Fresh every round, owned by exactly one role, and moved through the
//! phase functions by value. The report travels with it and is pushed to the
//! role's log when the round ends.

use super::{Accumulator, DcReport, SmId, SmReport};
use std::collections::{BTreeMap, BTreeSet};

/// Phase 1 contribution after backend parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contribution {
    /// Masked measurement and the PRF term the DC derived for this endpoint.
    Masked { masked: u128, prf: u128 },
    /// Homomorphic mode: presence only.
    Present,
}

/// Secret an endpoint carries from phase 1 into its chain step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Passthru {
    /// Blind added to the masked value and folded into the accumulator.
    Masked { blind: u128 },
    /// Raw measurement, encrypted when activated.
    Homomorphic { measurement: u64 },
}

/// Data Concentrator round state.
#[derive(Debug)]
pub struct DcRound {
    pub round: u64,
    /// First-seen contributions keyed by endpoint id.
    pub data: BTreeMap<SmId, Contribution>,
    pub s_initial: Option<Accumulator>,
    pub report: DcReport,
}

impl DcRound {
    pub fn new(round: u64, report: DcReport) -> Self {
        Self {
            round,
            data: BTreeMap::new(),
            s_initial: None,
            report,
        }
    }

    /// Endpoints that contributed in phase 1, ascending.
    pub fn l_rem(&self) -> BTreeSet<SmId> {
        self.data.keys().copied().collect()
    }
}

/// Smart Meter round state.
#[derive(Debug)]
pub struct SmRound {
    pub round: u64,
    pub passthru: Passthru,
    pub report: SmReport,
}
