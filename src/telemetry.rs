//! Tracing subscriber initialisation.

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Failure to install the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    Install(#[from] TryInitError),
}

const LEVEL_LADDER: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Returns the filter directive for the configured level and CLI verbosity.
///
/// Each `-v` raises the configured level by one step, up to `trace`. A
/// directive that is not a bare level is raised from `info`.
#[must_use]
pub fn effective_level(configured: &str, verbosity: u8) -> &str {
    if verbosity == 0 {
        return configured;
    }
    let floor = LEVEL_LADDER
        .iter()
        .position(|level| level.eq_ignore_ascii_case(configured.trim()))
        .unwrap_or(3);
    let raised = floor.saturating_add(usize::from(verbosity));
    LEVEL_LADDER.get(raised).copied().unwrap_or("trace")
}

/// Installs the process-wide subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the level is malformed or a subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig, verbosity: u8) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(effective_level(&config.level, verbosity))?,
    };
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
    }
    Ok(())
}
