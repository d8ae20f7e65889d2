//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Masking modulus must be greater than one
    #[error("Invalid modulus: {0} (must be > 1)")]
    InvalidModulus(u128),

    /// Value is not a reduced residue of the modulus
    #[error("Value {value} out of range for modulus {modulus}")]
    ValueOutOfRange {
        /// Offending value
        value: u128,
        /// Modulus it was checked against
        modulus: u128,
    },

    /// Requested key size cannot produce a usable Paillier modulus
    #[error("Invalid key size: {0} bits")]
    InvalidKeySize(u64),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Ciphertext is not an element of Z*_{n^2}
    #[error("Invalid ciphertext")]
    InvalidCiphertext,

    /// Plaintext is not smaller than the public modulus
    #[error("Plaintext does not fit the public modulus")]
    PlaintextTooLarge,

    /// Decrypted value does not fit the requested integer type
    #[error("Decrypted value overflows u128")]
    DecryptionOverflow,
}
