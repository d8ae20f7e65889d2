//! # AggFT Test Suite
//!
//! End-to-end rounds with one Data Concentrator and several Smart Meters.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Cluster builder, fault injection, report collection
//! │
//! └── integration/      # Whole-round scenarios
//!     ├── fault_tolerance.rs
//!     ├── homomorphic.rs
//!     ├── rounds.rs
//!     ├── hostile_input.rs
//!     ├── random_faults.rs
//!     └── tcp_transport.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p aggft-tests
//!
//! # By category
//! cargo test -p aggft-tests integration::fault_tolerance::
//! cargo test -p aggft-tests integration::tcp_transport::
//! ```
//!
//! Everything except the TCP tests runs on a paused Tokio clock, so a ten
//! second round completes instantly.

pub mod integration;
