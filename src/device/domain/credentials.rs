//! Probe credentials and their redacted reference form.

use super::DeviceDomainError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters kept from the secret digest.
const FINGERPRINT_LENGTH: usize = 16;

/// Username and optional secret used to probe a device.
///
/// The secret is held as a [`SecretString`] and never appears in `Debug`
/// output.
#[derive(Debug, Clone)]
pub struct ProbeCredentials {
    username: String,
    secret: Option<SecretString>,
}

impl ProbeCredentials {
    /// Creates credentials for `username`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDomainError::EmptyUsername`] when the username is blank.
    pub fn new(
        username: impl Into<String>,
        secret: Option<SecretString>,
    ) -> Result<Self, DeviceDomainError> {
        let normalized = username.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(DeviceDomainError::EmptyUsername);
        }
        Ok(Self {
            username: normalized,
            secret,
        })
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret, if one was supplied.
    #[must_use]
    pub const fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    /// Derives the reference that is safe to persist and log.
    #[must_use]
    pub fn to_reference(&self) -> CredentialsRef {
        CredentialsRef {
            username: self.username.clone(),
            fingerprint: self.secret.as_ref().map(fingerprint),
        }
    }
}

fn fingerprint(secret: &SecretString) -> String {
    let digest = Sha256::digest(secret.expose_secret().as_bytes());
    hex::encode(digest).chars().take(FINGERPRINT_LENGTH).collect()
}

/// Opaque reference to the credentials a device was discovered with.
///
/// Holds the username and a truncated SHA-256 fingerprint of the secret,
/// never the secret itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialsRef {
    username: String,
    fingerprint: Option<String>,
}

impl CredentialsRef {
    /// Rebuilds a reference from stored parts.
    #[must_use]
    pub const fn from_parts(username: String, fingerprint: Option<String>) -> Self {
        Self {
            username,
            fingerprint,
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret fingerprint, if a secret was supplied.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

impl fmt::Display for CredentialsRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fingerprint {
            Some(print) => write!(formatter, "{}#{print}", self.username),
            None => formatter.write_str(&self.username),
        }
    }
}
