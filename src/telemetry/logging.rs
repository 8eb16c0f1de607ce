//! Tracing subscriber initialisation.

use super::TelemetryError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` when set.
///
/// # Errors
///
/// Returns [`TelemetryError::Subscriber`] when the filter does not parse or a
/// global subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|err| TelemetryError::Subscriber(err.to_string()))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|err| TelemetryError::Subscriber(err.to_string()))
}
