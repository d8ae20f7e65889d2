//! # Blinding PRF
//!
//! Round-dependent pseudo-random function shared by each Smart Meter and the
//! Data Concentrator. Built on keyed BLAKE3: the 32-byte key is the
//! pre-shared secret, the little-endian round number is the input, and the
//! first 16 bytes of output are read as a little-endian `u128`.

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PRF key length in bytes.
pub const PRF_KEY_LEN: usize = 32;

/// Pre-shared PRF key (256-bit).
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct PrfKey([u8; PRF_KEY_LEN]);

impl PrfKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; PRF_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a random key.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; PRF_KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; PRF_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for PrfKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrfKey(..)")
    }
}

/// Evaluate the PRF for `round`.
pub fn prf(key: &PrfKey, round: u64) -> u128 {
    let hash = blake3::keyed_hash(key.as_bytes(), &round.to_le_bytes());
    let mut out = [0u8; 16];
    out.copy_from_slice(&hash.as_bytes()[..16]);
    u128::from_le_bytes(out)
}

/// Generate one key per Smart Meter.
pub fn generate_prf_keys<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, count: usize) -> Vec<PrfKey> {
    (0..count).map(|_| PrfKey::generate(rng)).collect()
}
