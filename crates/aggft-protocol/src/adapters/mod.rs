//! Adapters layer
//!
//! Ready-made [`MeasurementSource`](crate::ports::MeasurementSource)
//! implementations.

mod measurement;

pub use measurement::{ConstantMeasurement, FnMeasurement};
