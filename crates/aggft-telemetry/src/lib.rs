//! # AggFT Telemetry
//!
//! Logging setup shared by every AggFT process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aggft_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_role("dc");
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AGGFT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `AGGFT_JSON_LOGS` | `false` | JSON formatted output |
//! | `AGGFT_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `AGGFT_SERVICE_NAME` | `aggft` | Service name |
//! | `AGGFT_ROLE` | `sim` | Role label |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

// Used by `log_round_event!`
#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
