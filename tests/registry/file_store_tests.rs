//! File-backed store integration tests.

use super::helpers::{address, full_platform};
use camino::Utf8PathBuf;
use edge_registry::device::{
    adapters::{ScriptedCapabilityProber, file::FileDeviceStore},
    ports::{DeviceStore, ProbeReport},
    services::{DiscoveryConfig, DiscoveryCoordinator, DiscoveryRequest},
};
use mockable::DefaultClock;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn discovered_device_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("registry").join("devices.json"))
        .expect("utf-8 temp path");

    let store = Arc::new(FileDeviceStore::open(&path).await.expect("open store"));
    let prober = Arc::new(ScriptedCapabilityProber::new());
    prober.script_probe(address("10.0.0.5"), Ok(ProbeReport::complete(full_platform())));
    let coordinator = DiscoveryCoordinator::new(
        Arc::clone(&store),
        prober,
        Arc::new(DefaultClock),
        &DiscoveryConfig::default(),
    );
    let created = coordinator
        .discover(DiscoveryRequest::new("10.0.0.5", "pi").with_data_sources(vec!["meter".to_owned()]))
        .await
        .expect("discovery should succeed")
        .record;
    drop(coordinator);
    drop(store);

    let reopened = FileDeviceStore::open(&path).await.expect("reopen store");

    assert_eq!(reopened.get(created.id()).await.expect("persisted"), created);
    assert_eq!(
        reopened
            .find_by_ip(&address("10.0.0.5"))
            .await
            .expect("index rebuilt")
            .map(|record| record.id()),
        Some(created.id())
    );
}
