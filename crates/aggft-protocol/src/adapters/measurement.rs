//! Measurement sources

use crate::domain::SmId;
use crate::ports::MeasurementSource;

/// Same value every round. Defaults to `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantMeasurement(pub u64);

impl Default for ConstantMeasurement {
    fn default() -> Self {
        Self(1)
    }
}

impl MeasurementSource for ConstantMeasurement {
    fn measurement(&self, _id: SmId, _round: u64) -> u64 {
        self.0
    }
}

/// Measurement computed by a closure of `(id, round)`.
pub struct FnMeasurement<F>(pub F);

impl<F> MeasurementSource for FnMeasurement<F>
where
    F: Fn(SmId, u64) -> u64 + Send + Sync,
{
    fn measurement(&self, id: SmId, round: u64) -> u64 {
        (self.0)(id, round)
    }
}
