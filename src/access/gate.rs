//! The access gate composed from a key set, a policy, and a telemetry sink.

use super::{
    AccessDenial, AccessPolicy, ApiKeySet, AuthConfig, AuthObservation, AuthTelemetry, policy_for,
};
use std::fmt;
use std::sync::Arc;

/// Request-level API key check.
pub struct AccessGate {
    keys: ApiKeySet,
    policy: Box<dyn AccessPolicy>,
    telemetry: Arc<dyn AuthTelemetry>,
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AccessGate")
            .field("keys", &self.keys)
            .field("mode", &self.policy.mode())
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Creates a gate with an explicit policy.
    #[must_use]
    pub const fn new(
        keys: ApiKeySet,
        policy: Box<dyn AccessPolicy>,
        telemetry: Arc<dyn AuthTelemetry>,
    ) -> Self {
        Self {
            keys,
            policy,
            telemetry,
        }
    }

    /// Creates a gate from process configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig, telemetry: Arc<dyn AuthTelemetry>) -> Self {
        let keys = ApiKeySet::from_sources(
            config.api_key.as_ref(),
            config.allowed_api_keys.as_ref(),
        );
        Self::new(keys, policy_for(config.mode), telemetry)
    }

    /// Evaluates the key presented with a request.
    ///
    /// Every evaluation is recorded, whether or not the request proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenial`] when the policy refuses the request.
    pub fn evaluate(&self, presented: Option<&str>) -> Result<(), AccessDenial> {
        let check = self.keys.check(presented);
        let verdict = self.policy.decide(!self.keys.is_empty(), check);
        self.telemetry.record(&AuthObservation {
            present: check.present,
            valid: check.valid,
            mode: self.policy.mode(),
            outcome: verdict.outcome,
        });
        verdict.denial.map_or(Ok(()), Err)
    }
}
