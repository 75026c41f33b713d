//! Periodic liveness polling of registered devices.

use crate::device::{
    domain::{DeviceRecord, DeviceStatus, DeviceUpdate, LivenessObservation},
    ports::{CapabilityProber, DeviceStore, DeviceStoreError, DeviceStoreResult},
};
use futures::future::join_all;
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Settings for the health monitor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HealthMonitorConfig {
    /// Time between polling ticks.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Upper bound for one device's liveness check.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Counts of per-device outcomes for one polling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Devices that answered.
    pub online: usize,
    /// Devices that failed or timed out.
    pub offline: usize,
    /// Devices deleted while the tick was running.
    pub vanished: usize,
    /// Devices whose new status could not be written.
    pub write_failures: usize,
}

#[derive(Debug, Clone, Copy)]
enum PollOutcome {
    Recorded(DeviceStatus),
    Vanished,
    WriteFailed,
}

/// Background loop that keeps device status and `last_seen` current.
///
/// The monitor only writes liveness; it never re-classifies a device.
pub struct HealthMonitor<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    prober: Arc<P>,
    clock: Arc<C>,
    config: HealthMonitorConfig,
}

impl<S, P, C> HealthMonitor<S, P, C>
where
    S: DeviceStore,
    P: CapabilityProber,
    C: Clock + Send + Sync,
{
    /// Creates a monitor.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        prober: Arc<P>,
        clock: Arc<C>,
        config: HealthMonitorConfig,
    ) -> Self {
        Self {
            store,
            prober,
            clock,
            config,
        }
    }

    /// Polls every stored device once.
    ///
    /// Devices are checked concurrently, each under its own timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError`] when the device list cannot be read.
    /// Per-device write failures are counted, not returned.
    pub async fn poll_once(&self) -> DeviceStoreResult<PollSummary> {
        let devices = self.store.list().await?;
        let outcomes = join_all(devices.iter().map(|device| self.poll_device(device))).await;

        let summary = outcomes
            .into_iter()
            .fold(PollSummary::default(), |mut summary, outcome| {
                match outcome {
                    PollOutcome::Recorded(DeviceStatus::Online) => summary.online += 1,
                    PollOutcome::Recorded(_) => summary.offline += 1,
                    PollOutcome::Vanished => summary.vanished += 1,
                    PollOutcome::WriteFailed => summary.write_failures += 1,
                }
                summary
            });
        debug!(?summary, "health poll finished");
        Ok(summary)
    }

    async fn poll_device(&self, device: &DeviceRecord) -> PollOutcome {
        let check = timeout(
            self.config.probe_timeout,
            self.prober.check_liveness(device.ip()),
        )
        .await;
        let observation = match check {
            Ok(Ok(())) => LivenessObservation::Reachable {
                at: self.clock.utc(),
            },
            Ok(Err(err)) => {
                debug!(device_id = %device.id(), ip = %device.ip(), error = %err, "liveness check failed");
                LivenessObservation::Unreachable
            }
            Err(_) => {
                debug!(device_id = %device.id(), ip = %device.ip(), "liveness check timed out");
                LivenessObservation::Unreachable
            }
        };

        match self
            .store
            .apply(device.id(), DeviceUpdate::Liveness(observation))
            .await
        {
            Ok(updated) => {
                if updated.status() != device.status() {
                    info!(
                        device_id = %device.id(),
                        from = %device.status(),
                        to = %updated.status(),
                        "device status changed"
                    );
                }
                PollOutcome::Recorded(updated.status())
            }
            Err(DeviceStoreError::NotFound(_)) => PollOutcome::Vanished,
            Err(err) => {
                warn!(device_id = %device.id(), error = %err, "failed to record liveness");
                PollOutcome::WriteFailed
            }
        }
    }

    /// Polls on the configured interval until `cancel` fires.
    ///
    /// The first tick runs immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.config.interval, "health monitor started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.poll_once().await {
                        warn!(error = %err, "health poll could not list devices");
                    }
                }
            }
        }
        info!("health monitor stopped");
    }
}
