//! Driven ports (Outbound dependencies)

use crate::domain::SmId;

/// Where a Smart Meter's private measurement comes from.
pub trait MeasurementSource: Send + Sync {
    /// Measurement of endpoint `id` for `round`.
    fn measurement(&self, id: SmId, round: u64) -> u64;
}
