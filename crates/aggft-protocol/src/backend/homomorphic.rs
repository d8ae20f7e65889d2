//! Paillier backend
//!
//! The accumulator starts as `Enc(0)` and every active endpoint multiplies
//! in `Enc(m_i)`. Phase 1 carries no data; it only tells the DC who is up.
//! Only the DC holds the private key.

use super::BackendError;
use crate::domain::{Accumulator, Contribution, Mode, Passthru, Phase1Payload, Rejection};
use aggft_crypto::{Ciphertext, PaillierPrivateKey, PaillierPublicKey};
use rand::Rng;

fn check_ciphertext<'a>(
    pk: &PaillierPublicKey,
    s: &'a Accumulator,
) -> Result<&'a Ciphertext, Rejection> {
    match s {
        Accumulator::Ciphertext(c) => {
            pk.validate(c)
                .map_err(|e| Rejection::Payload(e.to_string()))?;
            Ok(c)
        }
        Accumulator::Masked(_) => Err(Rejection::Payload("expected a ciphertext".to_string())),
    }
}

/// DC half: the key pair.
#[derive(Clone, Debug)]
pub struct HomomorphicDc {
    private: PaillierPrivateKey,
}

impl HomomorphicDc {
    pub fn new(private: PaillierPrivateKey) -> Self {
        Self { private }
    }

    pub(super) fn parse_contribution(
        &self,
        payload: &Phase1Payload,
    ) -> Result<Contribution, Rejection> {
        match payload {
            Phase1Payload::Empty => Ok(Contribution::Present),
            Phase1Payload::Masked(_) => {
                Err(Rejection::Payload("expected an empty payload".to_string()))
            }
        }
    }

    pub(super) fn generate_s_initial<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Accumulator, BackendError> {
        let zero = self.private.public_key().encrypt_u64(0, rng)?;
        Ok(Accumulator::Ciphertext(zero))
    }

    pub(super) fn check_accumulator(&self, s: &Accumulator) -> Result<(), Rejection> {
        check_ciphertext(self.private.public_key(), s).map(|_| ())
    }

    pub(super) fn calc_aggregate(&self, s_final: &Accumulator) -> Result<u128, BackendError> {
        match s_final {
            Accumulator::Ciphertext(c) => Ok(self.private.decrypt_u128(c)?),
            Accumulator::Masked(_) => Err(BackendError::ModeMismatch(Mode::Homomorphic)),
        }
    }
}

/// SM half: the public key.
#[derive(Clone, Debug)]
pub struct HomomorphicSm {
    public: PaillierPublicKey,
}

impl HomomorphicSm {
    pub fn new(public: PaillierPublicKey) -> Self {
        Self { public }
    }

    pub(super) fn prep_data(measurement: u64) -> (Passthru, Phase1Payload) {
        (
            Passthru::Homomorphic { measurement },
            Phase1Payload::Empty,
        )
    }

    pub(super) fn check_accumulator(&self, s: &Accumulator) -> Result<(), Rejection> {
        check_ciphertext(&self.public, s).map(|_| ())
    }

    pub(super) fn aggregate_to_s<R: Rng + ?Sized>(
        &self,
        s: &Accumulator,
        passthru: &Passthru,
        rng: &mut R,
    ) -> Result<Accumulator, BackendError> {
        match (s, passthru) {
            (Accumulator::Ciphertext(c), Passthru::Homomorphic { measurement }) => {
                let own = self.public.encrypt_u64(*measurement, rng)?;
                Ok(Accumulator::Ciphertext(self.public.add(c, &own)))
            }
            _ => Err(BackendError::ModeMismatch(Mode::Homomorphic)),
        }
    }
}
