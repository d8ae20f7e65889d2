//! Error types for the protocol roles
//!
//! Only configuration and transport setup are exceptional. Everything that
//! can go wrong inside a round (quorum shortfall, timeouts, bad messages) is
//! recorded in the round report instead.

use super::SmId;
use aggft_network::NetworkError;

/// Metadata rejected at construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Quorum n_min must be at least 2, got {0}")]
    QuorumTooSmall(usize),

    #[error("Round length must be positive")]
    InvalidRoundLength,

    #[error("Phase 1 length must be positive and shorter than the round")]
    InvalidPhaseLength,

    #[error("Start time must be a representable non-negative Unix timestamp, got {0}")]
    InvalidStartTime(f64),

    #[error("Masking modulus must be greater than 1, got {0}")]
    ModulusTooSmall(u128),

    #[error("Expected one PRF key per endpoint ({expected}), got {actual}")]
    PrfKeyCountMismatch { expected: usize, actual: usize },

    #[error("At least one endpoint address is required")]
    NoEndpoints,

    #[error("Endpoint {id} is not configured ({n} endpoints)")]
    UnknownEndpoint { id: SmId, n: usize },

    #[error("Key material is for {actual} mode but metadata says {expected}")]
    ModeMismatch {
        expected: super::Mode,
        actual: super::Mode,
    },
}

/// Errors returned from running a role.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Network(#[from] NetworkError),
}

/// Result alias for role entry points.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
