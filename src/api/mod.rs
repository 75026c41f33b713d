//! HTTP surface of the registry.
//!
//! `GET /health` answers unconditionally. Everything under `/api` passes
//! through the [`AccessGate`] first.

mod auth;
mod dto;
mod error;
mod handlers;

pub use auth::{API_KEY_HEADER, require_api_key};
pub use dto::{
    DeviceResponse, HealthResponse, MessageResponse, RegisterDeviceBody, ServicesResponse,
    UpdateDeviceBody,
};
pub use error::ApiError;
pub use handlers::SERVICE_NAME;

use crate::access::AccessGate;
use crate::device::{
    ports::{CapabilityProber, DeviceStore},
    services::{DeviceRegistryService, DiscoveryCoordinator},
};
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use mockable::Clock;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub struct ApiState<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    discovery: Arc<DiscoveryCoordinator<S, P, C>>,
    registry: Arc<DeviceRegistryService<S>>,
    clock: Arc<C>,
}

impl<S, P, C> Clone for ApiState<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            discovery: Arc::clone(&self.discovery),
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, P, C> ApiState<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    /// Creates handler state from the registry services.
    #[must_use]
    pub const fn new(
        discovery: Arc<DiscoveryCoordinator<S, P, C>>,
        registry: Arc<DeviceRegistryService<S>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            discovery,
            registry,
            clock,
        }
    }
}

/// Builds the registry router.
pub fn router<S, P, C>(state: ApiState<S, P, C>, gate: Arc<AccessGate>) -> Router
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let devices = Router::new()
        .route(
            "/devices",
            get(handlers::list_devices::<S, P, C>).post(handlers::register_device::<S, P, C>),
        )
        .route(
            "/devices/{id}",
            get(handlers::get_device::<S, P, C>)
                .put(handlers::update_device::<S, P, C>)
                .delete(handlers::delete_device::<S, P, C>),
        )
        .route(
            "/devices/{id}/capabilities",
            get(handlers::device_capabilities::<S, P, C>),
        )
        .route(
            "/devices/{id}/services",
            get(handlers::device_services::<S, P, C>),
        )
        .route_layer(from_fn_with_state(gate, require_api_key));

    Router::new()
        .route("/health", get(handlers::health::<S, P, C>))
        .nest("/api", devices)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
