//! Per-mode authorization strategies.

use super::{AuthMode, AuthOutcome, KeyCheck};
use thiserror::Error;

/// Reason a request was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessDenial {
    /// Enforcement is on but no key is configured.
    #[error("Authentication configuration unavailable")]
    Unconfigured,
    /// No key was presented.
    #[error("Missing API key")]
    MissingKey,
    /// The presented key is not configured.
    #[error("Invalid API key")]
    InvalidKey,
}

/// What a policy concluded about one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Outcome reported to telemetry.
    pub outcome: AuthOutcome,
    /// Refusal, when the request must not proceed.
    pub denial: Option<AccessDenial>,
}

/// Action taken on a key check.
///
/// Every policy receives the same [`KeyCheck`]; they differ only in what
/// they do with a failure.
pub trait AccessPolicy: Send + Sync {
    /// Mode this policy implements.
    fn mode(&self) -> AuthMode;

    /// Decides the fate of a request.
    ///
    /// `keys_configured` is false when neither a primary key nor an
    /// allow-list entry exists.
    fn decide(&self, keys_configured: bool, check: KeyCheck) -> Verdict;
}

/// Lets every request through and only reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorPolicy;

impl AccessPolicy for MonitorPolicy {
    fn mode(&self) -> AuthMode {
        AuthMode::Monitor
    }

    fn decide(&self, _keys_configured: bool, check: KeyCheck) -> Verdict {
        Verdict {
            outcome: AuthOutcome::from_check(check),
            denial: None,
        }
    }
}

/// Refuses requests without a valid key.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnforcePolicy;

impl AccessPolicy for EnforcePolicy {
    fn mode(&self) -> AuthMode {
        AuthMode::Enforce
    }

    fn decide(&self, keys_configured: bool, check: KeyCheck) -> Verdict {
        if !keys_configured {
            return Verdict {
                outcome: AuthOutcome::AuthModeInvalidConfig,
                denial: Some(AccessDenial::Unconfigured),
            };
        }
        let outcome = AuthOutcome::from_check(check);
        let denial = match outcome {
            AuthOutcome::AuthBypass => Some(AccessDenial::MissingKey),
            AuthOutcome::AuthDenied => Some(AccessDenial::InvalidKey),
            AuthOutcome::AuthOk | AuthOutcome::AuthModeInvalidConfig => None,
        };
        Verdict { outcome, denial }
    }
}

/// Returns the policy for `mode`.
#[must_use]
pub fn policy_for(mode: AuthMode) -> Box<dyn AccessPolicy> {
    match mode {
        AuthMode::Monitor => Box::new(MonitorPolicy),
        AuthMode::Enforce => Box::new(EnforcePolicy),
    }
}
