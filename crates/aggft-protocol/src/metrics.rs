//! # Protocol Metrics
//!
//! Prometheus counters for round outcomes and traffic.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! aggft-protocol = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `aggft_rounds_total{role,outcome}` - Rounds finished, by outcome
//! - `aggft_messages_sent_total{role,result}` - Send attempts
//! - `aggft_messages_received_total{role}` - Inbound payloads, valid or not
//! - `aggft_chain_skips_total` - Unreachable chain candidates skipped

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Rounds finished, labeled by role and outcome
    pub static ref ROUNDS: IntCounterVec = register_int_counter_vec!(
        "aggft_rounds_total",
        "Total number of rounds finished",
        &["role", "outcome"]
    )
    .expect("Failed to create ROUNDS metric");

    /// Send attempts, labeled by role and result
    pub static ref MESSAGES_SENT: IntCounterVec = register_int_counter_vec!(
        "aggft_messages_sent_total",
        "Total number of messages sent",
        &["role", "result"]
    )
    .expect("Failed to create MESSAGES_SENT metric");

    /// Inbound payloads, labeled by role
    pub static ref MESSAGES_RECEIVED: IntCounterVec = register_int_counter_vec!(
        "aggft_messages_received_total",
        "Total number of messages received",
        &["role"]
    )
    .expect("Failed to create MESSAGES_RECEIVED metric");

    /// Chain candidates skipped
    pub static ref CHAIN_SKIPS: IntCounter = register_int_counter!(
        "aggft_chain_skips_total",
        "Total number of unreachable chain candidates skipped"
    )
    .expect("Failed to create CHAIN_SKIPS metric");
}

/// Record a finished round
#[cfg(feature = "metrics")]
pub fn record_round(role: &str, outcome: &str) {
    ROUNDS.with_label_values(&[role, outcome]).inc();
}

/// Record a send attempt
#[cfg(feature = "metrics")]
pub fn record_message_sent(role: &str, ok: bool) {
    let result = if ok { "ok" } else { "failed" };
    MESSAGES_SENT.with_label_values(&[role, result]).inc();
}

/// Record an inbound payload
#[cfg(feature = "metrics")]
pub fn record_message_received(role: &str) {
    MESSAGES_RECEIVED.with_label_values(&[role]).inc();
}

/// Record a skipped chain candidate
#[cfg(feature = "metrics")]
pub fn record_chain_skip() {
    CHAIN_SKIPS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_round(_role: &str, _outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_message_sent(_role: &str, _ok: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn record_message_received(_role: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_chain_skip() {}
