//! Driving ports (Inbound API)

use crate::domain::{ProtocolResult, ReportLog};
use async_trait::async_trait;

/// Entry points shared by the Data Concentrator and the Smart Meters.
///
/// Each call starts listening, runs whole rounds on the role's own schedule
/// and stops listening when it returns. Rounds never overlap.
#[async_trait]
pub trait AggregationRole: Send {
    /// Per-round report type.
    type Report: Clone + Send + Sync + 'static;

    /// Run round 0 only.
    async fn run_once(&mut self) -> ProtocolResult<()>;

    /// Run rounds `0..count`.
    async fn run_rounds(&mut self, count: u64) -> ProtocolResult<()>;

    /// Run rounds until the task is dropped. Returns only on setup failure.
    async fn run_forever(&mut self) -> ProtocolResult<()>;

    /// Handle to the reports written so far.
    fn reports(&self) -> ReportLog<Self::Report>;
}
