//! Request handlers for health, device, and discovery endpoints.

use super::dto::{
    DeviceResponse, HealthResponse, MessageResponse, RegisterDeviceBody, ServicesResponse,
    UpdateDeviceBody,
};
use super::{ApiError, ApiState};
use crate::device::{
    domain::{CapabilityVector, DeviceId},
    ports::{CapabilityProber, DeviceStore},
    services::{DiscoveryRequest, UpdateDeviceRequest},
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use mockable::Clock;

/// Name reported by the liveness endpoint.
pub const SERVICE_NAME: &str = "Edge Device Registry";

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<DeviceId> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn require(value: Option<String>) -> Option<String> {
    value.filter(|field| !field.trim().is_empty())
}

pub(super) async fn health<S, P, C>(State(state): State<ApiState<S, P, C>>) -> Json<HealthResponse>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "healthy",
        timestamp: state.clock.utc(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(super) async fn list_devices<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
) -> ApiResult<Json<Vec<DeviceResponse>>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let devices = state.registry.list().await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

pub(super) async fn register_device<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    body: Result<Json<RegisterDeviceBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DeviceResponse>)>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (Some(ip), Some(username)) = (require(body.ip), require(body.username)) else {
        return Err(ApiError::BadRequest(
            "IP address and username required".to_owned(),
        ));
    };

    let mut request = DiscoveryRequest::new(ip, username);
    if let Some(secret) = body.credentials {
        request = request.with_secret(secret);
    }
    if let Some(name) = body.name {
        request = request.with_name(name);
    }
    if let Some(sources) = body.data_sources {
        request = request.with_data_sources(sources);
    }

    let discovery = state.discovery.discover(request).await?;
    Ok((StatusCode::CREATED, Json(DeviceResponse::from(discovery.record))))
}

pub(super) async fn get_device<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeviceResponse>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let record = state.registry.get(parse_id(&id)?).await?;
    Ok(Json(DeviceResponse::from(record)))
}

pub(super) async fn update_device<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateDeviceBody>, JsonRejection>,
) -> ApiResult<Json<DeviceResponse>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let device_id = parse_id(&id)?;
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let request = UpdateDeviceRequest {
        name: body.name,
        data_sources: body.data_sources,
    };
    let record = state.registry.update(device_id, request).await?;
    Ok(Json(DeviceResponse::from(record)))
}

pub(super) async fn delete_device<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    state.registry.delete(parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "Device deleted successfully",
    }))
}

pub(super) async fn device_capabilities<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CapabilityVector>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let capabilities = state.registry.capabilities(parse_id(&id)?).await?;
    Ok(Json(capabilities))
}

pub(super) async fn device_services<S, P, C>(
    State(state): State<ApiState<S, P, C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServicesResponse>>
where
    S: DeviceStore + 'static,
    P: CapabilityProber + 'static,
    C: Clock + Send + Sync + 'static,
{
    let services = state.registry.services(parse_id(&id)?).await?;
    Ok(Json(ServicesResponse { services }))
}
