//! Round metadata
//!
//! Immutable parameters shared by every round of a run. [`Metadata`] holds
//! what all roles agree on (addresses, quorum, timing); [`DcMetadata`] and
//! [`SmMetadata`] add the key material each role is entitled to.
//!
//! Address validity is a per-role view: the DC's copy says which SMs it can
//! reach, SM `j`'s copy says which SMs (and whether the DC) `j` can reach.

use super::{ConfigError, SmId};
use aggft_crypto::{Modulus, PaillierPrivateKey, PaillierPublicKey, PrfKey};
use aggft_network::Address;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Default round length.
pub const DEFAULT_ROUND_LEN: Duration = Duration::from_secs(10);

/// Default phase 1 length.
pub const DEFAULT_PHASE_1_LEN: Duration = Duration::from_secs(5);

/// Default quorum.
pub const DEFAULT_N_MIN: usize = 2;

/// Privacy backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Additive masking with a per-endpoint PRF.
    Masking,
    /// Paillier additive homomorphic encryption.
    Homomorphic,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Masking => write!(f, "masking"),
            Mode::Homomorphic => write!(f, "homomorphic"),
        }
    }
}

/// Round timing.
///
/// Round `r` spans `[t_start + r·round_len, t_start + (r+1)·round_len)`;
/// phase 1 is its first `phase_1_len`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    t_start: Instant,
    t_round_len: Duration,
    t_phase_1_len: Duration,
}

impl Schedule {
    /// Validate and build a schedule.
    pub fn new(
        t_start: Instant,
        t_round_len: Duration,
        t_phase_1_len: Duration,
    ) -> Result<Self, ConfigError> {
        if t_round_len.is_zero() {
            return Err(ConfigError::InvalidRoundLength);
        }
        if t_phase_1_len.is_zero() || t_phase_1_len >= t_round_len {
            return Err(ConfigError::InvalidPhaseLength);
        }
        Ok(Self {
            t_start,
            t_round_len,
            t_phase_1_len,
        })
    }

    pub fn t_start(&self) -> Instant {
        self.t_start
    }

    pub fn t_round_len(&self) -> Duration {
        self.t_round_len
    }

    pub fn t_phase_1_len(&self) -> Duration {
        self.t_phase_1_len
    }

    /// Start of `round`.
    pub fn round_start(&self, round: u64) -> Instant {
        let nanos = self.t_round_len.as_nanos().saturating_mul(u128::from(round));
        let offset = Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX));
        self.t_start + offset
    }

    /// Deadline for phase 1 of `round`.
    pub fn phase_1_end(&self, round: u64) -> Instant {
        self.round_start(round) + self.t_phase_1_len
    }

    /// Deadline for phase 2 of `round`.
    pub fn round_end(&self, round: u64) -> Instant {
        self.round_start(round) + self.t_round_len
    }

    /// Time elapsed since `t_start` (zero before the start).
    pub fn elapsed(&self, at: Instant) -> Duration {
        at.saturating_duration_since(self.t_start)
    }
}

/// Convert a Unix timestamp in seconds to a runtime instant.
///
/// Negative, non-finite and out-of-range timestamps are rejected. Timestamps
/// in the past map to instants in the past when the runtime clock allows it,
/// otherwise to "now".
pub fn instant_from_unix(unix_secs: f64) -> Result<Instant, ConfigError> {
    if !unix_secs.is_finite() || unix_secs < 0.0 {
        return Err(ConfigError::InvalidStartTime(unix_secs));
    }
    let now = Instant::now();
    let now_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    let delta = unix_secs - now_unix;
    if delta >= 0.0 {
        Duration::try_from_secs_f64(delta)
            .ok()
            .and_then(|ahead| now.checked_add(ahead))
            .ok_or(ConfigError::InvalidStartTime(unix_secs))
    } else {
        Ok(Duration::try_from_secs_f64(-delta)
            .ok()
            .and_then(|behind| now.checked_sub(behind))
            .unwrap_or(now))
    }
}

/// Start of round 0 as given to the builder.
#[derive(Clone, Copy, Debug)]
enum StartTime {
    At(Instant),
    Unix(f64),
}

impl StartTime {
    fn resolve(self) -> Result<Instant, ConfigError> {
        match self {
            StartTime::At(instant) => Ok(instant),
            StartTime::Unix(secs) => instant_from_unix(secs),
        }
    }
}

/// Parameters shared by every role.
#[derive(Clone, Debug)]
pub struct Metadata {
    mode: Mode,
    dc_address: Address,
    sm_addresses: Vec<Address>,
    n_min: usize,
    schedule: Schedule,
}

impl Metadata {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn dc_address(&self) -> &Address {
        &self.dc_address
    }

    pub fn sm_addresses(&self) -> &[Address] {
        &self.sm_addresses
    }

    /// Address of endpoint `id`, if configured.
    pub fn sm_address(&self, id: SmId) -> Option<&Address> {
        self.sm_addresses.get(id)
    }

    /// Number of endpoints.
    pub fn n(&self) -> usize {
        self.sm_addresses.len()
    }

    pub fn n_min(&self) -> usize {
        self.n_min
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Whether `id` names a configured endpoint.
    pub fn contains(&self, id: SmId) -> bool {
        id < self.sm_addresses.len()
    }

    /// This role's view of the link to endpoint `id`.
    ///
    /// Out-of-range ids are ignored.
    #[must_use]
    pub fn with_sm_link(mut self, id: SmId, valid: bool) -> Self {
        if let Some(address) = self.sm_addresses.get_mut(id) {
            address.valid = valid;
        }
        self
    }

    /// This role's view of the link to the DC.
    #[must_use]
    pub fn with_dc_link(mut self, valid: bool) -> Self {
        self.dc_address.valid = valid;
        self
    }

    /// Attach DC key material.
    pub fn into_dc(self, keys: DcKeys) -> Result<DcMetadata, ConfigError> {
        self.check_mode(keys.mode())?;
        if let DcKeys::Masking { prf_keys, .. } = &keys {
            if prf_keys.len() != self.n() {
                return Err(ConfigError::PrfKeyCountMismatch {
                    expected: self.n(),
                    actual: prf_keys.len(),
                });
            }
        }
        Ok(DcMetadata { common: self, keys })
    }

    /// Attach key material for endpoint `id`.
    pub fn into_sm(self, id: SmId, keys: SmKeys) -> Result<SmMetadata, ConfigError> {
        self.check_mode(keys.mode())?;
        if !self.contains(id) {
            return Err(ConfigError::UnknownEndpoint { id, n: self.n() });
        }
        Ok(SmMetadata {
            common: self,
            id,
            keys,
        })
    }

    fn check_mode(&self, actual: Mode) -> Result<(), ConfigError> {
        if actual != self.mode {
            return Err(ConfigError::ModeMismatch {
                expected: self.mode,
                actual,
            });
        }
        Ok(())
    }
}

/// Fluent builder for [`Metadata`].
///
/// ```rust,ignore
/// let meta = MetadataBuilder::new(Mode::Masking, dc, sms)
///     .n_min(2)
///     .round_len(Duration::from_secs(10))
///     .phase_1_len(Duration::from_secs(5))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct MetadataBuilder {
    mode: Mode,
    dc_address: Address,
    sm_addresses: Vec<Address>,
    n_min: usize,
    t_start: Option<StartTime>,
    t_round_len: Duration,
    t_phase_1_len: Duration,
}

impl MetadataBuilder {
    pub fn new(
        mode: Mode,
        dc_address: Address,
        sm_addresses: impl IntoIterator<Item = Address>,
    ) -> Self {
        Self {
            mode,
            dc_address,
            sm_addresses: sm_addresses.into_iter().collect(),
            n_min: DEFAULT_N_MIN,
            t_start: None,
            t_round_len: DEFAULT_ROUND_LEN,
            t_phase_1_len: DEFAULT_PHASE_1_LEN,
        }
    }

    pub fn n_min(mut self, n_min: usize) -> Self {
        self.n_min = n_min;
        self
    }

    /// Absolute start of round 0. Defaults to the time of `build`.
    pub fn t_start(mut self, t_start: Instant) -> Self {
        self.t_start = Some(StartTime::At(t_start));
        self
    }

    /// Start of round 0 as a Unix timestamp in seconds. Checked by `build`.
    pub fn t_start_unix(mut self, unix_secs: f64) -> Self {
        self.t_start = Some(StartTime::Unix(unix_secs));
        self
    }

    pub fn round_len(mut self, len: Duration) -> Self {
        self.t_round_len = len;
        self
    }

    pub fn phase_1_len(mut self, len: Duration) -> Self {
        self.t_phase_1_len = len;
        self
    }

    pub fn build(self) -> Result<Metadata, ConfigError> {
        if self.sm_addresses.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        if self.n_min < 2 {
            return Err(ConfigError::QuorumTooSmall(self.n_min));
        }
        let t_start = match self.t_start {
            Some(start) => start.resolve()?,
            None => Instant::now(),
        };
        let schedule = Schedule::new(
            t_start,
            self.t_round_len,
            self.t_phase_1_len,
        )?;
        Ok(Metadata {
            mode: self.mode,
            dc_address: self.dc_address,
            sm_addresses: self.sm_addresses,
            n_min: self.n_min,
            schedule,
        })
    }
}

/// Key material held by the Data Concentrator.
#[derive(Clone, Debug)]
pub enum DcKeys {
    /// Modulus and every endpoint's PRF key, indexed by id.
    Masking { k: Modulus, prf_keys: Vec<PrfKey> },
    /// Full key pair.
    Homomorphic { private: PaillierPrivateKey },
}

impl DcKeys {
    /// Masking keys from a raw modulus.
    pub fn masking(k: u128, prf_keys: Vec<PrfKey>) -> Result<Self, ConfigError> {
        let k = Modulus::new(k).map_err(|_| ConfigError::ModulusTooSmall(k))?;
        Ok(Self::Masking { k, prf_keys })
    }

    pub fn homomorphic(private: PaillierPrivateKey) -> Self {
        Self::Homomorphic { private }
    }

    pub fn mode(&self) -> Mode {
        match self {
            DcKeys::Masking { .. } => Mode::Masking,
            DcKeys::Homomorphic { .. } => Mode::Homomorphic,
        }
    }
}

/// Key material held by one Smart Meter.
#[derive(Clone, Debug)]
pub enum SmKeys {
    /// Modulus and this endpoint's PRF key.
    Masking { k: Modulus, prf_key: PrfKey },
    /// Public key only.
    Homomorphic { public: PaillierPublicKey },
}

impl SmKeys {
    /// Masking keys from a raw modulus.
    pub fn masking(k: u128, prf_key: PrfKey) -> Result<Self, ConfigError> {
        let k = Modulus::new(k).map_err(|_| ConfigError::ModulusTooSmall(k))?;
        Ok(Self::Masking { k, prf_key })
    }

    pub fn homomorphic(public: PaillierPublicKey) -> Self {
        Self::Homomorphic { public }
    }

    pub fn mode(&self) -> Mode {
        match self {
            SmKeys::Masking { .. } => Mode::Masking,
            SmKeys::Homomorphic { .. } => Mode::Homomorphic,
        }
    }
}

/// Data Concentrator metadata.
#[derive(Clone, Debug)]
pub struct DcMetadata {
    common: Metadata,
    keys: DcKeys,
}

impl DcMetadata {
    pub fn common(&self) -> &Metadata {
        &self.common
    }

    pub fn keys(&self) -> &DcKeys {
        &self.keys
    }

    pub fn into_parts(self) -> (Metadata, DcKeys) {
        (self.common, self.keys)
    }
}

/// Smart Meter metadata.
#[derive(Clone, Debug)]
pub struct SmMetadata {
    common: Metadata,
    id: SmId,
    keys: SmKeys,
}

impl SmMetadata {
    pub fn common(&self) -> &Metadata {
        &self.common
    }

    pub fn id(&self) -> SmId {
        self.id
    }

    pub fn keys(&self) -> &SmKeys {
        &self.keys
    }

    /// This endpoint's own address.
    pub fn own_address(&self) -> &Address {
        // `into_sm` checked the id
        &self.common.sm_addresses[self.id]
    }

    pub fn into_parts(self) -> (Metadata, SmId, SmKeys) {
        (self.common, self.id, self.keys)
    }
}
