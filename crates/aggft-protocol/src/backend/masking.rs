//! Masking backend over Z_k
//!
//! Endpoint `i` sends `masked_i = (m_i + s_i + prf_i) mod k` in phase 1 and
//! folds `s_i` into the accumulator in phase 2. The DC knows every PRF key,
//! so for the final `l_act`:
//!
//! ```text
//! Σ masked_i − (s_final − s_initial) − Σ prf_i ≡ Σ m_i  (mod k)
//! ```

use super::BackendError;
use crate::domain::{Accumulator, Contribution, Mode, Passthru, Phase1Payload, Rejection, SmId};
use aggft_crypto::{prf, Modulus, PrfKey};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

fn check_masked(k: &Modulus, s: &Accumulator) -> Result<u128, Rejection> {
    match s {
        Accumulator::Masked(v) => k.check(*v).map_err(|e| Rejection::Payload(e.to_string())),
        Accumulator::Ciphertext(_) => Err(Rejection::Payload(
            "expected a masked accumulator".to_string(),
        )),
    }
}

/// DC half: modulus and every endpoint's PRF key.
#[derive(Clone, Debug)]
pub struct MaskingDc {
    k: Modulus,
    prf_keys: Vec<PrfKey>,
}

impl MaskingDc {
    pub fn new(k: Modulus, prf_keys: Vec<PrfKey>) -> Self {
        Self { k, prf_keys }
    }

    pub(super) fn parse_contribution(
        &self,
        round: u64,
        id: SmId,
        payload: &Phase1Payload,
    ) -> Result<Contribution, Rejection> {
        let masked = match payload {
            Phase1Payload::Masked(v) => self
                .k
                .check(*v)
                .map_err(|e| Rejection::Payload(e.to_string()))?,
            Phase1Payload::Empty => {
                return Err(Rejection::Payload("expected a masked value".to_string()))
            }
        };
        let key = self
            .prf_keys
            .get(id)
            .ok_or(Rejection::UnknownEndpoint(id))?;
        Ok(Contribution::Masked {
            masked,
            prf: self.k.reduce(prf(key, round)),
        })
    }

    pub(super) fn generate_s_initial<R: Rng + ?Sized>(&self, rng: &mut R) -> Accumulator {
        Accumulator::Masked(self.k.random(rng))
    }

    pub(super) fn check_accumulator(&self, s: &Accumulator) -> Result<(), Rejection> {
        check_masked(&self.k, s).map(|_| ())
    }

    pub(super) fn calc_aggregate(
        &self,
        data: &BTreeMap<SmId, Contribution>,
        s_initial: &Accumulator,
        s_final: &Accumulator,
        l_act: &BTreeSet<SmId>,
    ) -> Result<u128, BackendError> {
        let (Accumulator::Masked(s_initial), Accumulator::Masked(s_final)) = (s_initial, s_final)
        else {
            return Err(BackendError::ModeMismatch(Mode::Masking));
        };

        let mut masked_sum = 0;
        let mut prf_sum = 0;
        for id in l_act {
            match data.get(id) {
                Some(Contribution::Masked { masked, prf }) => {
                    masked_sum = self.k.add(masked_sum, *masked);
                    prf_sum = self.k.add(prf_sum, *prf);
                }
                Some(Contribution::Present) => {
                    return Err(BackendError::ModeMismatch(Mode::Masking))
                }
                None => return Err(BackendError::MissingContribution(*id)),
            }
        }

        let blinds = self.k.sub(*s_final, *s_initial);
        Ok(self.k.sub(self.k.sub(masked_sum, blinds), prf_sum))
    }
}

/// SM half: modulus and this endpoint's PRF key.
#[derive(Clone, Debug)]
pub struct MaskingSm {
    k: Modulus,
    prf_key: PrfKey,
}

impl MaskingSm {
    pub fn new(k: Modulus, prf_key: PrfKey) -> Self {
        Self { k, prf_key }
    }

    pub(super) fn prep_data<R: Rng + ?Sized>(
        &self,
        round: u64,
        measurement: u64,
        rng: &mut R,
    ) -> (Passthru, Phase1Payload) {
        let blind = self.k.random(rng);
        let p = self.k.reduce(prf(&self.prf_key, round));
        let m = self.k.reduce(u128::from(measurement));
        let masked = self.k.add(self.k.add(m, blind), p);
        (Passthru::Masked { blind }, Phase1Payload::Masked(masked))
    }

    pub(super) fn check_accumulator(&self, s: &Accumulator) -> Result<(), Rejection> {
        check_masked(&self.k, s).map(|_| ())
    }

    pub(super) fn aggregate_to_s(
        &self,
        s: &Accumulator,
        passthru: &Passthru,
    ) -> Result<Accumulator, BackendError> {
        match (s, passthru) {
            (Accumulator::Masked(s), Passthru::Masked { blind }) => {
                Ok(Accumulator::Masked(self.k.add(self.k.reduce(*s), *blind)))
            }
            _ => Err(BackendError::ModeMismatch(Mode::Masking)),
        }
    }
}
