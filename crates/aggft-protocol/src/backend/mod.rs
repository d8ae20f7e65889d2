//! Aggregation backends
//!
//! Four extension points plug into the round state machine:
//!
//! | Operation | Role | Masking | Homomorphic |
//! |-----------|------|---------|-------------|
//! | `generate_s_initial` | DC | uniform in Z_k | `Enc(0)` |
//! | `prep_data` | SM | `(m + s + prf) mod k` | empty |
//! | `aggregate_to_s` | SM | `(s + s_i) mod k` | `s ⊕ Enc(m_i)` |
//! | `calc_aggregate` | DC | `Σmasked − (s_final − s_initial) − Σprf` | `Dec(s_final)` |
//!
//! Dispatch is a closed enum per role built from that role's key material.

mod homomorphic;
mod masking;

pub use homomorphic::{HomomorphicDc, HomomorphicSm};
pub use masking::{MaskingDc, MaskingSm};

use crate::domain::{
    Accumulator, Contribution, DcKeys, Mode, Passthru, Phase1Payload, Rejection, SmId, SmKeys,
};
use aggft_crypto::CryptoError;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Failure inside a backend computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Value does not belong to the {0} backend")]
    ModeMismatch(Mode),

    #[error("No phase 1 contribution from endpoint {0}")]
    MissingContribution(SmId),
}

/// Data Concentrator side of a backend.
#[derive(Clone, Debug)]
pub enum DcBackend {
    Masking(MaskingDc),
    Homomorphic(HomomorphicDc),
}

impl DcBackend {
    pub fn from_keys(keys: DcKeys) -> Self {
        match keys {
            DcKeys::Masking { k, prf_keys } => Self::Masking(MaskingDc::new(k, prf_keys)),
            DcKeys::Homomorphic { private } => Self::Homomorphic(HomomorphicDc::new(private)),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Masking(_) => Mode::Masking,
            Self::Homomorphic(_) => Mode::Homomorphic,
        }
    }

    /// Backend-specific phase 1 validation and parsing.
    pub fn parse_contribution(
        &self,
        round: u64,
        id: SmId,
        payload: &Phase1Payload,
    ) -> Result<Contribution, Rejection> {
        match self {
            Self::Masking(b) => b.parse_contribution(round, id, payload),
            Self::Homomorphic(b) => b.parse_contribution(payload),
        }
    }

    pub fn generate_s_initial<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Accumulator, BackendError> {
        match self {
            Self::Masking(b) => Ok(b.generate_s_initial(rng)),
            Self::Homomorphic(b) => b.generate_s_initial(rng),
        }
    }

    /// Backend-specific phase 2 validation.
    pub fn check_result(&self, s: &Accumulator) -> Result<(), Rejection> {
        match self {
            Self::Masking(b) => b.check_accumulator(s),
            Self::Homomorphic(b) => b.check_accumulator(s),
        }
    }

    pub fn calc_aggregate(
        &self,
        data: &BTreeMap<SmId, Contribution>,
        s_initial: &Accumulator,
        s_final: &Accumulator,
        l_act: &BTreeSet<SmId>,
    ) -> Result<u128, BackendError> {
        match self {
            Self::Masking(b) => b.calc_aggregate(data, s_initial, s_final, l_act),
            Self::Homomorphic(b) => b.calc_aggregate(s_final),
        }
    }
}

/// Smart Meter side of a backend.
#[derive(Clone, Debug)]
pub enum SmBackend {
    Masking(MaskingSm),
    Homomorphic(HomomorphicSm),
}

impl SmBackend {
    pub fn from_keys(keys: SmKeys) -> Self {
        match keys {
            SmKeys::Masking { k, prf_key } => Self::Masking(MaskingSm::new(k, prf_key)),
            SmKeys::Homomorphic { public } => Self::Homomorphic(HomomorphicSm::new(public)),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Masking(_) => Mode::Masking,
            Self::Homomorphic(_) => Mode::Homomorphic,
        }
    }

    /// Phase 1 payload plus the secret kept for the chain step.
    pub fn prep_data<R: Rng + ?Sized>(
        &self,
        round: u64,
        measurement: u64,
        rng: &mut R,
    ) -> (Passthru, Phase1Payload) {
        match self {
            Self::Masking(b) => b.prep_data(round, measurement, rng),
            Self::Homomorphic(_) => HomomorphicSm::prep_data(measurement),
        }
    }

    /// Backend-specific activation validation.
    pub fn check_activation(&self, s: &Accumulator) -> Result<(), Rejection> {
        match self {
            Self::Masking(b) => b.check_accumulator(s),
            Self::Homomorphic(b) => b.check_accumulator(s),
        }
    }

    /// Fold this endpoint's secret into the running accumulator.
    pub fn aggregate_to_s<R: Rng + ?Sized>(
        &self,
        s: &Accumulator,
        passthru: &Passthru,
        rng: &mut R,
    ) -> Result<Accumulator, BackendError> {
        match self {
            Self::Masking(b) => b.aggregate_to_s(s, passthru),
            Self::Homomorphic(b) => b.aggregate_to_s(s, passthru, rng),
        }
    }
}
