//! # aggft-protocol
//!
//! Round state machines for the Data Concentrator (DC) and the Smart
//! Meters (SM).
//!
//! ## Architecture
//!
//! Every round has two phases. In phase 1 each SM sends a contribution to
//! the DC. If at least `n_min` SMs contributed, the DC starts a chain in
//! phase 2: the running accumulator is handed from SM to SM in ascending id
//! order, skipping unreachable ones, and the last SM sends it back.
//!
//! ```text
//!             phase 1                         phase 2
//! SM0 ──contribution──┐        ┌─activation─→ SM0 ──→ SM2 ──result─┐
//! SM1 ──contribution──┼─→ DC ──┘              (SM1 unreachable)     │
//! SM2 ──contribution──┘   ↑                                         │
//!                         └─────────────────────────────────────────┘
//! ```
//!
//! ### Backends
//!
//! - **Masking**: measurements hidden by a random blind and a per-endpoint
//!   PRF over Z_k; the blinds cancel in the aggregate.
//! - **Homomorphic**: the accumulator is a Paillier ciphertext only the DC
//!   can decrypt.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aggft_protocol::{AggregationRole, DataConcentrator, DcKeys, MetadataBuilder, Mode};
//!
//! let meta = MetadataBuilder::new(Mode::Masking, dc_address, sm_addresses)
//!     .n_min(2)
//!     .build()?;
//! let mut dc = DataConcentrator::new(meta.into_dc(DcKeys::masking(k, prf_keys)?)?, network);
//! dc.run_once().await?;
//! let report = dc.reports().last();
//! ```
//!
//! ## Guarantees
//!
//! - No aggregate unless at least `n_min` endpoints were folded in
//! - No endpoint in both `l_rem` and `l_act`; no endpoint acts twice
//! - Bad messages are discarded and counted, never fatal

pub mod adapters;
pub mod backend;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{ConstantMeasurement, FnMeasurement};
pub use backend::{BackendError, DcBackend, SmBackend};
pub use domain::{
    Accumulator, Chain, ConfigError, DcKeys, DcMetadata, DcReport, Message, Metadata,
    MetadataBuilder, Mode, NetStats, Phase1Payload, ProtocolError, ProtocolResult, Rejection,
    ReportLog, Schedule, SmId, SmKeys, SmMetadata, SmReport,
};
pub use ports::{AggregationRole, MeasurementSource};
pub use service::{DataConcentrator, SmartMeter};
