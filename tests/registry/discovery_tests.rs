//! Discovery coordinator integration tests.

use super::helpers::{Harness, address, docker_ready, full_platform, harness, script_device};
use edge_registry::device::{
    domain::{DeviceStatus, DeviceType},
    ports::{DeviceStore, ProbeCheck, ProbeCompleteness, ProbeError, ProbeReport},
    services::{
        DiscoveryConfig, DiscoveryDisposition, DiscoveryError, DiscoveryLockScope,
        DiscoveryRequest,
    },
};
use rstest::rstest;
use std::sync::Arc;

fn request(ip: &str) -> DiscoveryRequest {
    DiscoveryRequest::new(ip, "pi").with_secret("raspberry".into())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn docker_host_registers_as_docker_ready(harness: Harness) {
    script_device(&harness.prober, "10.0.0.5", docker_ready());

    let discovery = harness
        .discovery
        .discover(request("10.0.0.5"))
        .await
        .expect("discovery should succeed");

    let record = discovery.record;
    assert_eq!(discovery.disposition, DiscoveryDisposition::Created);
    assert_eq!(record.device_type(), DeviceType::DockerReady);
    assert_eq!(record.status(), DeviceStatus::Online);
    assert_eq!(record.name().as_str(), "Edge Device 10.0.0.5");
    assert_eq!(record.last_seen(), Some(record.created_at()));
    assert_eq!(
        harness.store.get(record.id()).await.expect("stored"),
        record
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rediscovery_upgrades_type_under_same_id(harness: Harness) {
    script_device(&harness.prober, "10.0.0.5", docker_ready());
    let first = harness
        .discovery
        .discover(request("10.0.0.5"))
        .await
        .expect("first discovery should succeed");

    script_device(&harness.prober, "10.0.0.5", full_platform());
    let second = harness
        .discovery
        .discover(request("10.0.0.5"))
        .await
        .expect("rediscovery should succeed");

    assert_eq!(second.disposition, DiscoveryDisposition::Refreshed);
    assert_eq!(second.record.id(), first.record.id());
    assert_eq!(second.record.device_type(), DeviceType::FullPlatform);
    assert_eq!(second.record.created_at(), first.record.created_at());
    assert_eq!(harness.store.list().await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_target_creates_no_record(harness: Harness) {
    let result = harness.discovery.discover(request("10.0.0.9")).await;

    assert!(matches!(
        result,
        Err(DiscoveryError::Unreachable {
            source: ProbeError::Unreachable(_),
            ..
        })
    ));
    assert!(harness.store.list().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_probe_still_creates_record(harness: Harness) {
    harness.prober.script_probe(
        address("10.0.0.6"),
        Ok(ProbeReport::partial(
            docker_ready(),
            vec![ProbeCheck::PlatformAgent],
        )),
    );

    let discovery = harness
        .discovery
        .discover(request("10.0.0.6"))
        .await
        .expect("partial discovery should succeed");

    assert_eq!(
        discovery.completeness,
        ProbeCompleteness::Partial {
            timed_out: vec![ProbeCheck::PlatformAgent]
        }
    );
    assert_eq!(discovery.record.device_type(), DeviceType::DockerReady);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_username_is_rejected_before_probing(harness: Harness) {
    let result = harness
        .discovery
        .discover(DiscoveryRequest::new("10.0.0.5", "  "))
        .await;

    assert!(matches!(result, Err(DiscoveryError::Validation(_))));
    assert_eq!(harness.prober.probes_started(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlapping_discoveries_of_one_address_yield_one_busy(harness: Harness) {
    script_device(&harness.prober, "10.0.0.5", docker_ready());
    harness.prober.hold();

    let discovery = Arc::clone(&harness.discovery);
    let first = tokio::spawn(async move { discovery.discover(request("10.0.0.5")).await });
    harness.prober.wait_for_probes(1).await;

    let second = harness.discovery.discover(request("10.0.0.5")).await;
    harness.prober.release();
    let first_result = first.await.expect("discovery task should join");

    assert!(matches!(second, Err(DiscoveryError::Busy(_))));
    assert!(first_result.is_ok());
    assert_eq!(harness.store.list().await.expect("list").len(), 1);
}

fn scoped(lock_scope: DiscoveryLockScope) -> Harness {
    let harness = Harness::with_discovery(&DiscoveryConfig {
        lock_scope,
        ..DiscoveryConfig::default()
    });
    script_device(&harness.prober, "10.0.0.5", docker_ready());
    script_device(&harness.prober, "10.0.0.6", docker_ready());
    harness
}

#[tokio::test(flavor = "multi_thread")]
async fn per_target_lock_lets_unrelated_targets_overlap() {
    let harness = scoped(DiscoveryLockScope::PerTarget);
    harness.prober.hold();

    let discovery = Arc::clone(&harness.discovery);
    let first = tokio::spawn(async move { discovery.discover(request("10.0.0.5")).await });
    let discovery = Arc::clone(&harness.discovery);
    let second = tokio::spawn(async move { discovery.discover(request("10.0.0.6")).await });
    harness.prober.wait_for_probes(2).await;
    harness.prober.release();

    assert!(first.await.expect("first task should join").is_ok());
    assert!(second.await.expect("second task should join").is_ok());
    assert_eq!(harness.store.list().await.expect("list").len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn global_lock_rejects_unrelated_targets() {
    let harness = scoped(DiscoveryLockScope::Global);
    harness.prober.hold();

    let discovery = Arc::clone(&harness.discovery);
    let first = tokio::spawn(async move { discovery.discover(request("10.0.0.5")).await });
    harness.prober.wait_for_probes(1).await;

    let second = harness.discovery.discover(request("10.0.0.6")).await;
    harness.prober.release();

    assert!(matches!(second, Err(DiscoveryError::Busy(_))));
    assert!(first.await.expect("first task should join").is_ok());
}
