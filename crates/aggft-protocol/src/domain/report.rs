//! Round reports
//!
//! One report per round per role. The protocol only ever writes to them;
//! they accumulate across rounds and are the observable outcome of a run.
//! Timestamps are offsets from the metadata's `t_start`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Network counters shared by both roles.
///
/// Sizes are serialized byte lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetStats {
    pub net_rcv: u64,
    pub net_rcv_size: u64,
    pub net_snd_succ: u64,
    pub net_snd_succ_size: u64,
    pub net_snd_fail: u64,
    pub net_snd_fail_size: u64,
}

impl NetStats {
    pub fn record_received(&mut self, size: usize) {
        self.net_rcv += 1;
        self.net_rcv_size += size as u64;
    }

    pub fn record_sent(&mut self, size: usize, ok: bool) {
        if ok {
            self.net_snd_succ += 1;
            self.net_snd_succ_size += size as u64;
        } else {
            self.net_snd_fail += 1;
            self.net_snd_fail_size += size as u64;
        }
    }

    /// Send attempts, successful or not.
    pub fn net_snd(&self) -> u64 {
        self.net_snd_succ + self.net_snd_fail
    }
}

/// What the Data Concentrator saw in one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcReport {
    pub round: u64,
    pub t_start: Duration,
    pub t_phase_1: Duration,
    pub t_end: Duration,
    /// The round ran to a defined end (always true once recorded).
    pub terminated: bool,
    /// An aggregate was computed.
    pub success: bool,
    pub phase_1_count: usize,
    pub phase_1_sms: Vec<usize>,
    pub phase_2_count: usize,
    pub phase_2_sms: Vec<usize>,
    pub aggregate: Option<u128>,
    pub net: NetStats,
}

/// What one Smart Meter saw in one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmReport {
    pub id: usize,
    pub round: u64,
    pub t_start: Duration,
    pub t_end: Duration,
    /// Phase 1 contribution reached the DC.
    pub contributed: bool,
    /// This endpoint received a valid activation and folded its value in.
    pub activated: bool,
    /// This endpoint sent the phase 2 result to the DC.
    pub reported: bool,
    pub net: NetStats,
}

/// Shared, append-only list of reports.
///
/// Cloning yields another handle to the same list, so a caller can watch a
/// role that runs in its own task.
#[derive(Debug)]
pub struct ReportLog<R> {
    inner: Arc<parking_lot::RwLock<Vec<R>>>,
}

impl<R> Clone for ReportLog<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for ReportLog<R> {
    fn default() -> Self {
        Self {
            inner: Arc::new(parking_lot::RwLock::new(Vec::new())),
        }
    }
}

impl<R: Clone> ReportLog<R> {
    pub fn push(&self, report: R) {
        self.inner.write().push(report);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of every report so far.
    pub fn snapshot(&self) -> Vec<R> {
        self.inner.read().clone()
    }

    pub fn last(&self) -> Option<R> {
        self.inner.read().last().cloned()
    }
}

impl<R: Serialize> ReportLog<R> {
    /// Reports as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.inner.read())
    }
}
