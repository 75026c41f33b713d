//! Identifier, address, and validated-name types for edge devices.

use super::DeviceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use uuid::Uuid;

/// Maximum length for a device name.
const MAX_DEVICE_NAME_LENGTH: usize = 255;

/// Unique identifier for a registered device.
///
/// Identifiers are random v4 UUIDs, so an identifier is never handed out
/// twice, even after the record it named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Creates a new random device identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a device identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for DeviceId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| DeviceDomainError::InvalidDeviceId(value.to_owned()))
    }
}

/// Network address used to reach a device.
///
/// Accepts an IP address, a socket address, or a `host[:port]` pair. The
/// canonical form is what the registry indexes on, so `10.0.0.5` and
/// ` 10.0.0.5 ` name the same device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress {
    canonical: String,
    url_host: String,
    port: Option<u16>,
}

impl DeviceAddress {
    /// Parses and normalizes a device address.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDomainError::EmptyAddress`] for blank input and
    /// [`DeviceDomainError::InvalidAddress`] when the value is not an IP
    /// address, socket address, or `host[:port]` pair.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DeviceDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DeviceDomainError::EmptyAddress);
        }

        if let Ok(socket) = trimmed.parse::<SocketAddr>() {
            return Ok(Self {
                canonical: socket.to_string(),
                url_host: url_host_for(socket.ip()),
                port: Some(socket.port()),
            });
        }

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Self {
                canonical: ip.to_string(),
                url_host: url_host_for(ip),
                port: None,
            });
        }

        parse_host_and_port(trimmed)
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Returns the host component in a form usable inside a URL.
    ///
    /// IPv6 hosts are wrapped in brackets.
    #[must_use]
    pub fn url_host(&self) -> &str {
        &self.url_host
    }

    /// Returns the explicit port, if one was supplied.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }
}

fn url_host_for(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    }
}

fn parse_host_and_port(value: &str) -> Result<DeviceAddress, DeviceDomainError> {
    let invalid = || DeviceDomainError::InvalidAddress(value.to_owned());
    let (host, port) = match value.split_once(':') {
        Some((host, port_text)) => (host, Some(port_text.parse::<u16>().map_err(|_| invalid())?)),
        None => (value, None),
    };

    let is_valid_host = !host.is_empty()
        && !host.starts_with(['-', '.'])
        && host
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '.'));
    if !is_valid_host {
        return Err(invalid());
    }

    let lowered = host.to_ascii_lowercase();
    let canonical = port.map_or_else(
        || lowered.clone(),
        |port_number| format!("{lowered}:{port_number}"),
    );
    Ok(DeviceAddress {
        canonical,
        url_host: lowered,
        port,
    })
}

impl TryFrom<String> for DeviceAddress {
    type Error = DeviceDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DeviceAddress> for String {
    fn from(value: DeviceAddress) -> Self {
        value.canonical
    }
}

impl AsRef<str> for DeviceAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated human-readable device label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceName(String);

impl DeviceName {
    /// Creates a validated device name.
    ///
    /// The input is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDomainError`] when the name is empty or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, DeviceDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(DeviceDomainError::EmptyDeviceName);
        }

        if normalized.chars().count() > MAX_DEVICE_NAME_LENGTH {
            return Err(DeviceDomainError::DeviceNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Derives the default name for a device reached at `address`.
    #[must_use]
    pub fn derived_from(address: &DeviceAddress) -> Self {
        Self(format!("Edge Device {address}"))
    }

    /// Returns the device name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeviceName {
    type Error = DeviceDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceName> for String {
    fn from(value: DeviceName) -> Self {
        value.0
    }
}

impl AsRef<str> for DeviceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier of a data source an operator has opted a device into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataSourceId(String);

impl DataSourceId {
    /// Creates a validated data source identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDomainError::EmptyDataSource`] when the identifier is
    /// blank.
    pub fn new(value: impl Into<String>) -> Result<Self, DeviceDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(DeviceDomainError::EmptyDataSource);
        }
        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DataSourceId {
    type Error = DeviceDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DataSourceId> for String {
    fn from(value: DataSourceId) -> Self {
        value.0
    }
}

impl fmt::Display for DataSourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
