//! Registry service integration tests.

use super::helpers::{Harness, harness, legacy_edge, script_device};
use edge_registry::device::{
    domain::{DeviceId, DeviceRecord, DeviceType},
    services::{DeviceRegistryServiceError, DiscoveryRequest, UpdateDeviceRequest},
};
use rstest::rstest;

async fn register_legacy(harness: &Harness) -> DeviceRecord {
    script_device(&harness.prober, "192.168.1.20", legacy_edge());
    harness
        .discovery
        .discover(DiscoveryRequest::new("192.168.1.20", "admin").with_name("Inverter gateway"))
        .await
        .expect("discovery should succeed")
        .record
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_changes_only_settable_fields(harness: Harness) {
    let record = register_legacy(&harness).await;

    let updated = harness
        .registry
        .update(
            record.id(),
            UpdateDeviceRequest {
                name: Some("Roof array".to_owned()),
                data_sources: Some(vec!["solar".to_owned(), "battery".to_owned()]),
            },
        )
        .await
        .expect("update should succeed");

    assert_eq!(updated.name().as_str(), "Roof array");
    let sources: Vec<&str> = updated
        .data_sources()
        .iter()
        .map(|source| source.as_str())
        .collect();
    assert_eq!(sources, vec!["battery", "solar"]);
    assert_eq!(updated.device_type(), DeviceType::LegacyEdge);
    assert_eq!(updated.status(), record.status());
    assert_eq!(updated.last_seen(), record.last_seen());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_update_is_rejected(harness: Harness) {
    let record = register_legacy(&harness).await;

    let result = harness
        .registry
        .update(record.id(), UpdateDeviceRequest::default())
        .await;

    assert!(matches!(result, Err(DeviceRegistryServiceError::EmptyUpdate)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn projections_expose_stored_capabilities(harness: Harness) {
    let record = register_legacy(&harness).await;

    let capabilities = harness
        .registry
        .capabilities(record.id())
        .await
        .expect("capabilities should load");
    let services = harness
        .registry
        .services(record.id())
        .await
        .expect("services should load");

    assert_eq!(&capabilities, record.capabilities());
    let names: Vec<&str> = services.iter().map(|service| service.name()).collect();
    assert_eq!(names, vec!["redis", "nginx"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_device_is_gone_and_id_not_reused(harness: Harness) {
    let record = register_legacy(&harness).await;

    harness
        .registry
        .delete(record.id())
        .await
        .expect("delete should succeed");
    let second_delete = harness.registry.delete(record.id()).await;
    let lookup = harness.registry.get(record.id()).await;
    let again = register_legacy(&harness).await;

    assert!(matches!(
        second_delete,
        Err(DeviceRegistryServiceError::NotFound(_))
    ));
    assert!(matches!(lookup, Err(DeviceRegistryServiceError::NotFound(_))));
    assert_ne!(again.id(), record.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_id_is_not_found(harness: Harness) {
    let missing = DeviceId::new();

    let result = harness.registry.get(missing).await;

    assert!(matches!(
        result,
        Err(DeviceRegistryServiceError::NotFound(id)) if id == missing
    ));
}
