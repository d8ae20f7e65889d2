//! # AggFT Crypto - Aggregation Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `masking` | Modular arithmetic over Z_k | Additive blinding of measurements |
//! | `prf` | Keyed BLAKE3 | Round-dependent PRF term (masking mode) |
//! | `paillier` | Paillier (`g = n + 1`) | Additively homomorphic accumulator |
//! | `primes` | Miller-Rabin | Paillier key generation |
//!
//! ## Security Properties
//!
//! - **Masking**: a uniformly random blind per Smart Meter per round hides
//!   each measurement; blinds cancel only in the sum.
//! - **PRF**: computable by exactly one Smart Meter and the Data Concentrator,
//!   so an eavesdropper that learns a blind still sees a masked value.
//! - **Paillier**: IND-CPA under the decisional composite residuosity
//!   assumption; Smart Meters never hold the private key.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod masking;
pub mod paillier;
pub mod prf;
pub mod primes;

// Re-exports
pub use errors::CryptoError;
pub use masking::Modulus;
pub use paillier::{Ciphertext, PaillierKeyPair, PaillierPrivateKey, PaillierPublicKey};
pub use prf::{generate_prf_keys, prf, PrfKey, PRF_KEY_LEN};

// Big integer type used in the public Paillier API
pub use num_bigint;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
