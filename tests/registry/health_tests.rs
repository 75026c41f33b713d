//! Health monitor integration tests.

use super::helpers::{Harness, address, docker_ready, harness, script_device};
use edge_registry::device::{
    domain::{DeviceId, DeviceStatus, DeviceType},
    ports::{DeviceStore, ProbeError},
    services::{DiscoveryRequest, PollSummary},
};
use rstest::rstest;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn register(harness: &Harness, ip: &str) -> DeviceId {
    script_device(&harness.prober, ip, docker_ready());
    harness
        .discovery
        .discover(DiscoveryRequest::new(ip, "pi"))
        .await
        .expect("discovery should succeed")
        .record
        .id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_poll_marks_offline_and_keeps_last_seen(harness: Harness) {
    let id = register(&harness, "10.0.0.5").await;
    let before = harness.store.get(id).await.expect("stored");
    harness.prober.script_liveness(
        address("10.0.0.5"),
        Err(ProbeError::Unreachable(address("10.0.0.5"))),
    );

    let summary = harness.monitor.poll_once().await.expect("poll should run");

    let after = harness.store.get(id).await.expect("stored");
    assert_eq!(summary.offline, 1);
    assert_eq!(after.status(), DeviceStatus::Offline);
    assert_eq!(after.last_seen(), before.last_seen());
    assert_eq!(after.capabilities(), before.capabilities());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recovery_returns_online_and_advances_last_seen(harness: Harness) {
    let id = register(&harness, "10.0.0.5").await;
    harness.prober.script_liveness(
        address("10.0.0.5"),
        Err(ProbeError::Timeout(address("10.0.0.5"))),
    );
    harness.monitor.poll_once().await.expect("poll should run");
    let offline = harness.store.get(id).await.expect("stored");

    tokio::time::sleep(Duration::from_millis(5)).await;
    harness.prober.script_liveness(address("10.0.0.5"), Ok(()));
    harness.monitor.poll_once().await.expect("poll should run");

    let online = harness.store.get(id).await.expect("stored");
    assert_eq!(offline.status(), DeviceStatus::Offline);
    assert_eq!(online.status(), DeviceStatus::Online);
    assert!(online.last_seen() > offline.last_seen());
    assert_eq!(online.device_type(), DeviceType::DockerReady);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hanging_device_does_not_block_others(harness: Harness) {
    register(&harness, "10.0.0.5").await;
    register(&harness, "10.0.0.6").await;
    harness.prober.hang_liveness(address("10.0.0.5"));
    harness.prober.script_liveness(address("10.0.0.6"), Ok(()));

    let summary = tokio::time::timeout(Duration::from_secs(2), harness.monitor.poll_once())
        .await
        .expect("poll should finish within the per-device timeout")
        .expect("poll should run");

    assert_eq!(
        summary,
        PollSummary {
            online: 1,
            offline: 1,
            vanished: 0,
            write_failures: 0,
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_polls_until_cancelled(harness: Harness) {
    let id = register(&harness, "10.0.0.5").await;
    harness.prober.script_liveness(
        address("10.0.0.5"),
        Err(ProbeError::Unreachable(address("10.0.0.5"))),
    );

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let monitor = harness.monitor;
    let task = tokio::spawn(async move { monitor.run(token).await });

    let mut status = DeviceStatus::Online;
    for _ in 0..50 {
        status = harness.store.get(id).await.expect("stored").status();
        if status == DeviceStatus::Offline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("monitor should stop after cancellation")
        .expect("monitor task should join");
    assert_eq!(status, DeviceStatus::Offline);
}
