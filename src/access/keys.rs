//! Authorization mode and API key validation.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the gate reacts to a failed key check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum AuthMode {
    /// Validate and report, never block.
    #[default]
    Monitor,
    /// Validate and reject failures.
    Enforce,
}

/// Error returned for an unrecognised authorization mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown auth mode '{0}', expected 'monitor' or 'enforce'")]
pub struct ParseAuthModeError(pub String);

impl AuthMode {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Enforce => "enforce",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuthMode {
    type Error = ParseAuthModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "monitor" => Ok(Self::Monitor),
            "enforce" => Ok(Self::Enforce),
            _ => Err(ParseAuthModeError(value.to_owned())),
        }
    }
}

impl TryFrom<String> for AuthMode {
    type Error = ParseAuthModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ParseAuthModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

/// Result of checking a presented key.
///
/// A missing key is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCheck {
    /// Whether a key was presented.
    pub present: bool,
    /// Whether the presented key is configured.
    pub valid: bool,
}

/// The configured primary key and allow-list, stored as SHA-256 digests.
#[derive(Clone, Default)]
pub struct ApiKeySet {
    digests: HashSet<[u8; 32]>,
}

impl fmt::Debug for ApiKeySet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiKeySet")
            .field("keys", &self.digests.len())
            .finish()
    }
}

impl ApiKeySet {
    /// Builds the set from the primary key and a comma-separated allow-list.
    ///
    /// Entries are trimmed; empty entries are ignored and duplicates collapse.
    #[must_use]
    pub fn from_sources(primary: Option<&SecretString>, allow_list: Option<&SecretString>) -> Self {
        let primary_keys = primary.map(|key| key.expose_secret()).into_iter();
        let listed_keys = allow_list
            .map(|list| list.expose_secret().split(','))
            .into_iter()
            .flatten();
        Self::from_keys(primary_keys.chain(listed_keys))
    }

    /// Builds the set from individual keys.
    #[must_use]
    pub fn from_keys<'key>(keys: impl IntoIterator<Item = &'key str>) -> Self {
        let digests = keys
            .into_iter()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(digest)
            .collect();
        Self { digests }
    }

    /// Returns whether no key is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Returns the number of distinct configured keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Checks a presented key against the set.
    #[must_use]
    pub fn check(&self, presented: Option<&str>) -> KeyCheck {
        match presented.map(str::trim).filter(|key| !key.is_empty()) {
            None => KeyCheck {
                present: false,
                valid: false,
            },
            Some(key) => KeyCheck {
                present: true,
                valid: self.digests.contains(&digest(key)),
            },
        }
    }
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}
