//! Structured logging.
//!
//! Events carry consistent fields so a round can be followed across roles:
//! - `service`: service name
//! - `role`: `dc` or `sm`
//! - `id`: endpoint id (SMs only)
//! - `round`: round index

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::Config` for an unparsable filter and
/// `TelemetryError::AlreadyInitialized` if a global subscriber exists.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
    });
    let text_layer = (config.console_output && !config.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        role = %config.role,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a round event with the standard `role` and `round` fields.
///
/// ```rust,ignore
/// log_round_event!(info, "dc", round, "Aggregate computed", aggregate = 42);
/// ```
#[macro_export]
macro_rules! log_round_event {
    ($level:ident, $role:expr, $round:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            role = $role,
            round = $round,
            $($($field)*,)?
            $msg
        )
    };
}
