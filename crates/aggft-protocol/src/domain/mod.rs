//! Domain layer
//!
//! Pure types and rules: metadata, wire messages, chain traversal, message
//! validation, round state and reports. No I/O.

mod chain;
mod error;
mod message;
mod metadata;
mod report;
mod round;
mod validation;

pub use chain::*;
pub use error::*;
pub use message::*;
pub use metadata::*;
pub use report::*;
pub use round::*;
pub use validation::*;

/// Endpoint id, the index into the SM address list.
pub type SmId = usize;
