//! Mapping from service failures to HTTP responses.

use crate::access::AccessDenial;
use crate::device::services::{DeviceRegistryServiceError, DiscoveryError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure returned by a request handler.
///
/// Every variant renders as `{"error": "<message>"}` with a distinct status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Unknown device id.
    #[error("Device not found")]
    NotFound,
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),
    /// Overlapping discovery rejected.
    #[error("{0}")]
    DiscoveryBusy(String),
    /// Target did not answer its probe.
    #[error("{0}")]
    DiscoveryUnreachable(String),
    /// Access gate refusal.
    #[error(transparent)]
    Access(#[from] AccessDenial),
    /// Persistence failed.
    #[error("Internal server error")]
    Store,
}

impl ApiError {
    /// Returns the status code this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::DiscoveryBusy(_) => StatusCode::CONFLICT,
            Self::DiscoveryUnreachable(_) => StatusCode::BAD_GATEWAY,
            Self::Access(AccessDenial::Unconfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Access(AccessDenial::MissingKey | AccessDenial::InvalidKey) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Validation(source) => Self::BadRequest(source.to_string()),
            DiscoveryError::Busy(address) => {
                Self::DiscoveryBusy(format!("Discovery already in progress for {address}"))
            }
            DiscoveryError::Unreachable { address, source } => {
                Self::DiscoveryUnreachable(format!("Device {address} unreachable: {source}"))
            }
            DiscoveryError::Store(source) => {
                error!(error = %source, "discovery could not persist device");
                Self::Store
            }
        }
    }
}

impl From<DeviceRegistryServiceError> for ApiError {
    fn from(err: DeviceRegistryServiceError) -> Self {
        match err {
            DeviceRegistryServiceError::NotFound(_) => Self::NotFound,
            DeviceRegistryServiceError::EmptyUpdate => {
                Self::BadRequest("Update data required".to_owned())
            }
            DeviceRegistryServiceError::Validation(source) => Self::BadRequest(source.to_string()),
            DeviceRegistryServiceError::Store(source) => {
                error!(error = %source, "registry store operation failed");
                Self::Store
            }
        }
    }
}
