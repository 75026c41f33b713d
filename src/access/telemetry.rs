//! Observability records emitted for every gated request.

use super::{AuthMode, KeyCheck};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// What the gate concluded about a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
    /// A configured key was presented.
    AuthOk,
    /// No key was presented.
    AuthBypass,
    /// A key was presented but is not configured.
    AuthDenied,
    /// Enforcement is on but no key is configured.
    AuthModeInvalidConfig,
}

impl AuthOutcome {
    /// Derives the outcome of a key check.
    #[must_use]
    pub const fn from_check(check: KeyCheck) -> Self {
        match (check.present, check.valid) {
            (false, _) => Self::AuthBypass,
            (true, false) => Self::AuthDenied,
            (true, true) => Self::AuthOk,
        }
    }

    /// Returns the metric-style name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthOk => "AuthOk",
            Self::AuthBypass => "AuthBypass",
            Self::AuthDenied => "AuthDenied",
            Self::AuthModeInvalidConfig => "AuthModeInvalidConfig",
        }
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthObservation {
    /// Whether a key was presented.
    pub present: bool,
    /// Whether the key was valid.
    pub valid: bool,
    /// Mode the gate ran in.
    pub mode: AuthMode,
    /// Conclusion drawn.
    pub outcome: AuthOutcome,
}

/// Sink for gate observations.
pub trait AuthTelemetry: Send + Sync {
    /// Records one observation. Must not block.
    fn record(&self, observation: &AuthObservation);
}

/// Emits observations as `tracing` events on the `edge_registry::access`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuthTelemetry;

impl AuthTelemetry for TracingAuthTelemetry {
    fn record(&self, observation: &AuthObservation) {
        let AuthObservation {
            present,
            valid,
            mode,
            outcome,
        } = *observation;
        match outcome {
            AuthOutcome::AuthOk => info!(
                target: "edge_registry::access",
                present, valid, mode = %mode, outcome = %outcome,
                "api key accepted"
            ),
            AuthOutcome::AuthBypass | AuthOutcome::AuthDenied => warn!(
                target: "edge_registry::access",
                present, valid, mode = %mode, outcome = %outcome,
                "api key check failed"
            ),
            AuthOutcome::AuthModeInvalidConfig => warn!(
                target: "edge_registry::access",
                present, valid, mode = %mode, outcome = %outcome,
                "enforce mode has no configured keys"
            ),
        }
    }
}

/// Keeps observations in memory for inspection.
#[derive(Debug, Default)]
pub struct RecordingAuthTelemetry {
    observations: Mutex<Vec<AuthObservation>>,
}

impl RecordingAuthTelemetry {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every observation recorded so far.
    #[must_use]
    pub fn observations(&self) -> Vec<AuthObservation> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthTelemetry for RecordingAuthTelemetry {
    fn record(&self, observation: &AuthObservation) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*observation);
    }
}
