//! Error types for device domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing device domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceDomainError {
    /// The device address is empty after trimming.
    #[error("device address must not be empty")]
    EmptyAddress,

    /// The device address is neither an IP address nor a `host[:port]` pair.
    #[error("device address '{0}' is not a valid IP address or host[:port]")]
    InvalidAddress(String),

    /// The device name is empty after trimming.
    #[error("device name must not be empty")]
    EmptyDeviceName,

    /// The device name exceeds the storage limit.
    #[error("device name exceeds 255 character limit: {0}")]
    DeviceNameTooLong(String),

    /// A data source identifier is empty after trimming.
    #[error("data source identifier must not be empty")]
    EmptyDataSource,

    /// The probe username is empty after trimming.
    #[error("probe username must not be empty")]
    EmptyUsername,

    /// A device identifier could not be parsed.
    #[error("invalid device identifier: {0}")]
    InvalidDeviceId(String),
}

/// Error returned while parsing a device status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown device status: {0}")]
pub struct ParseDeviceStatusError(pub String);

/// Error returned while parsing a device type tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown device type: {0}")]
pub struct ParseDeviceTypeError(pub String);
