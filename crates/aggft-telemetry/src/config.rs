//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration for one AggFT process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// Role of this process (`dc`, `sm`, or `sim` for a whole simulation)
    pub role: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to write to stdout at all
    pub console_output: bool,

    /// JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "aggft".to_string(),
            role: "sim".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AGGFT_SERVICE_NAME`: Service name (default: aggft)
    /// - `AGGFT_ROLE`: Role label (default: sim)
    /// - `AGGFT_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `AGGFT_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `AGGFT_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("AGGFT_SERVICE_NAME").unwrap_or(defaults.service_name),
            role: lookup("AGGFT_ROLE").unwrap_or(defaults.role),
            log_level: lookup("AGGFT_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("AGGFT_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),
            json_logs: lookup("AGGFT_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Configuration for one role.
    pub fn for_role(role: &str) -> Self {
        let mut config = Self::from_env();
        config.role = role.to_string();
        config
    }
}
