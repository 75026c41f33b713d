//! Progressive API key authorization.
//!
//! The gate validates a presented key against the configured primary key and
//! allow-list, then hands the result to a per-mode [`AccessPolicy`]:
//! [`MonitorPolicy`] always lets the request through, [`EnforcePolicy`]
//! refuses failures. Both report every evaluation to an [`AuthTelemetry`]
//! sink.

mod gate;
mod keys;
mod policy;
mod telemetry;

pub use gate::AccessGate;
pub use keys::{ApiKeySet, AuthMode, KeyCheck, ParseAuthModeError};
pub use policy::{AccessDenial, AccessPolicy, EnforcePolicy, MonitorPolicy, Verdict, policy_for};
pub use telemetry::{
    AuthObservation, AuthOutcome, AuthTelemetry, RecordingAuthTelemetry, TracingAuthTelemetry,
};

use secrecy::SecretString;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// Access gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Gate mode.
    pub mode: AuthMode,
    /// Primary API key.
    #[serde(deserialize_with = "secret_from_scalar")]
    pub api_key: Option<SecretString>,
    /// Comma-separated additional keys.
    #[serde(deserialize_with = "secret_from_scalar")]
    pub allowed_api_keys: Option<SecretString>,
}

/// Reads a key from any scalar.
///
/// Environment providers type values on sight, so an all-digit key arrives
/// as a number rather than a string.
fn secret_from_scalar<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarSecretVisitor)
}

struct ScalarSecretVisitor;

impl<'de> Visitor<'de> for ScalarSecretVisitor {
    type Value = Option<SecretString>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an API key string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_owned())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(Some(SecretString::from(value.to_string())))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Self)
    }
}
