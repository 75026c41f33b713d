//! Shared world state for access gate BDD scenarios.

use edge_registry::access::{
    AccessDenial, AccessGate, ApiKeySet, AuthMode, AuthTelemetry, RecordingAuthTelemetry,
    policy_for,
};
use rstest::fixture;
use std::sync::Arc;

/// Scenario world for access gate behaviour tests.
pub struct AccessWorld {
    /// Sink the gate reports to.
    pub telemetry: Arc<RecordingAuthTelemetry>,
    /// Gate under test, built by a given step.
    pub gate: Option<AccessGate>,
    /// Result of the last evaluation.
    pub last_result: Option<Result<(), AccessDenial>>,
}

impl AccessWorld {
    /// Creates a world with no gate configured yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            telemetry: Arc::new(RecordingAuthTelemetry::new()),
            gate: None,
            last_result: None,
        }
    }

    /// Installs a gate for `mode` over `keys`.
    pub fn configure(&mut self, mode: &str, keys: ApiKeySet) -> Result<(), eyre::Report> {
        let parsed: AuthMode = mode.parse()?;
        self.gate = Some(AccessGate::new(
            keys,
            policy_for(parsed),
            Arc::clone(&self.telemetry) as Arc<dyn AuthTelemetry>,
        ));
        Ok(())
    }
}

impl Default for AccessWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AccessWorld {
    AccessWorld::default()
}
