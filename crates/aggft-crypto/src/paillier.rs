//! # Paillier Additive Homomorphic Encryption
//!
//! Textbook Paillier with `g = n + 1`:
//!
//! - `Enc(m) = (1 + m·n) · r^n mod n²`
//! - `Enc(a) · Enc(b) mod n² = Enc(a + b)`
//! - `Dec(c) = L(c^λ mod n²) · μ mod n`, with `L(x) = (x - 1) / n`
//!
//! Smart Meters only ever hold the public key; the Data Concentrator holds
//! the private key and decrypts the final accumulator.

use crate::primes::generate_prime;
use crate::CryptoError;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Smallest accepted modulus size.
pub const MIN_KEY_BITS: u64 = 64;

/// Paillier ciphertext, an element of Z*_{n²}.
///
/// Serialized as a decimal string.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(#[serde_as(as = "DisplayFromStr")] BigUint);

impl Ciphertext {
    /// Wrap a raw value (unchecked; see [`PaillierPublicKey::validate`]).
    pub fn from_raw(value: BigUint) -> Self {
        Self(value)
    }
}

/// Paillier public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierPublicKey {
    n: BigUint,
    n_squared: BigUint,
}

impl PaillierPublicKey {
    /// Build a public key from its modulus.
    pub fn from_modulus(n: BigUint) -> Self {
        let n_squared = &n * &n;
        Self { n, n_squared }
    }

    /// Public modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Bit length of `n`.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt `m < n`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PlaintextTooLarge` if `m >= n`.
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        m: &BigUint,
        rng: &mut R,
    ) -> Result<Ciphertext, CryptoError> {
        if *m >= self.n {
            return Err(CryptoError::PlaintextTooLarge);
        }
        let r = self.random_unit(rng);
        let gm = (BigUint::one() + m * &self.n) % &self.n_squared;
        let rn = r.modpow(&self.n, &self.n_squared);
        Ok(Ciphertext((gm * rn) % &self.n_squared))
    }

    /// Encrypt a `u64` measurement.
    pub fn encrypt_u64<R: Rng + ?Sized>(
        &self,
        m: u64,
        rng: &mut R,
    ) -> Result<Ciphertext, CryptoError> {
        self.encrypt(&BigUint::from(m), rng)
    }

    /// Homomorphic addition: `Enc(a) ⊕ Enc(b) = Enc(a + b mod n)`.
    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        Ciphertext((&a.0 * &b.0) % &self.n_squared)
    }

    /// Check that a ciphertext is a unit of Z_{n²}.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidCiphertext` for out-of-range or
    /// non-invertible values.
    pub fn validate(&self, c: &Ciphertext) -> Result<(), CryptoError> {
        if c.0.is_zero() || c.0 >= self.n_squared || !c.0.gcd(&self.n).is_one() {
            return Err(CryptoError::InvalidCiphertext);
        }
        Ok(())
    }

    fn random_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        loop {
            let r = rng.gen_biguint_range(&BigUint::one(), &self.n);
            if r.gcd(&self.n).is_one() {
                return r;
            }
        }
    }
}

/// Paillier private key.
#[derive(Clone)]
pub struct PaillierPrivateKey {
    public: PaillierPublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl PaillierPrivateKey {
    /// Derive the private key from the two primes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyGenerationFailed` if `λ` is not invertible
    /// modulo `n` (only possible for badly chosen primes).
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self, CryptoError> {
        if p == q {
            return Err(CryptoError::KeyGenerationFailed(
                "primes must be distinct".to_string(),
            ));
        }
        let public = PaillierPublicKey::from_modulus(p * q);
        let lambda = (p - 1u32).lcm(&(q - 1u32));
        let mu = mod_inverse(&lambda, &public.n).ok_or_else(|| {
            CryptoError::KeyGenerationFailed("lambda not invertible mod n".to_string())
        })?;
        Ok(Self { public, lambda, mu })
    }

    /// Matching public key.
    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public
    }

    /// Decrypt to a residue mod `n`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidCiphertext` if `c` is not a valid
    /// ciphertext for this key.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint, CryptoError> {
        self.public.validate(c)?;
        let n = &self.public.n;
        let x = c.0.modpow(&self.lambda, &self.public.n_squared);
        let l = (x - 1u32) / n;
        Ok((l * &self.mu) % n)
    }

    /// Decrypt and convert to `u128`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptionOverflow` if the plaintext exceeds
    /// `u128::MAX`.
    pub fn decrypt_u128(&self, c: &Ciphertext) -> Result<u128, CryptoError> {
        self.decrypt(c)?
            .to_u128()
            .ok_or(CryptoError::DecryptionOverflow)
    }
}

impl std::fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("bits", &self.public.bits())
            .finish_non_exhaustive()
    }
}

/// Paillier key pair generation.
pub struct PaillierKeyPair;

impl PaillierKeyPair {
    /// Generate a key pair whose modulus has exactly `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeySize` if `bits` is odd or below
    /// [`MIN_KEY_BITS`].
    pub fn generate<R: Rng + ?Sized>(
        bits: u64,
        rng: &mut R,
    ) -> Result<(PaillierPrivateKey, PaillierPublicKey), CryptoError> {
        if bits < MIN_KEY_BITS || bits % 2 != 0 {
            return Err(CryptoError::InvalidKeySize(bits));
        }
        loop {
            let p = generate_prime(bits / 2, rng);
            let q = generate_prime(bits / 2, rng);
            if p == q {
                continue;
            }
            let sk = PaillierPrivateKey::from_primes(&p, &q)?;
            let pk = sk.public_key().clone();
            return Ok((sk, pk));
        }
    }
}

fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let modulus = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a.clone()), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return None;
    }
    old_s.mod_floor(&modulus).to_biguint()
}
