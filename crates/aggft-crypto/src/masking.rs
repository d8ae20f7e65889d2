//! # Additive Masking over Z_k
//!
//! Modular arithmetic for the masking backend. All operations take and return
//! reduced residues and never overflow, for any modulus up to `u128::MAX`.

use crate::CryptoError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Masking modulus `k` (always > 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128", into = "u128")]
pub struct Modulus(u128);

impl Modulus {
    /// Create a modulus.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidModulus` if `k <= 1`.
    pub fn new(k: u128) -> Result<Self, CryptoError> {
        if k <= 1 {
            return Err(CryptoError::InvalidModulus(k));
        }
        Ok(Self(k))
    }

    /// Raw modulus value.
    pub fn get(&self) -> u128 {
        self.0
    }

    /// Reduce an arbitrary value.
    pub fn reduce(&self, value: u128) -> u128 {
        value % self.0
    }

    /// Check that `value` is already reduced.
    pub fn check(&self, value: u128) -> Result<u128, CryptoError> {
        if value >= self.0 {
            return Err(CryptoError::ValueOutOfRange {
                value,
                modulus: self.0,
            });
        }
        Ok(value)
    }

    /// `(a + b) mod k`
    pub fn add(&self, a: u128, b: u128) -> u128 {
        let (a, b) = (self.reduce(a), self.reduce(b));
        let gap = self.0 - b;
        if a >= gap {
            a - gap
        } else {
            a + b
        }
    }

    /// `(a - b) mod k`
    pub fn sub(&self, a: u128, b: u128) -> u128 {
        let (a, b) = (self.reduce(a), self.reduce(b));
        if a >= b {
            a - b
        } else {
            self.0 - (b - a)
        }
    }

    /// Sum of all values, mod k.
    pub fn sum<I: IntoIterator<Item = u128>>(&self, values: I) -> u128 {
        values.into_iter().fold(0, |acc, v| self.add(acc, v))
    }

    /// Uniform random residue in `[0, k)`.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> u128 {
        rng.gen_range(0..self.0)
    }
}

impl TryFrom<u128> for Modulus {
    type Error = CryptoError;

    fn try_from(k: u128) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}

impl From<Modulus> for u128 {
    fn from(k: Modulus) -> Self {
        k.0
    }
}
