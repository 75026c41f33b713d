//! Deterministic prober driven by pre-scripted answers.
//!
//! Used by tests to simulate devices without a network. Probes can be held
//! in flight until released, which lets callers observe overlapping
//! discoveries.

use crate::device::{
    domain::{DeviceAddress, ProbeCredentials},
    ports::{CapabilityProber, ProbeError, ProbeReport, ProbeResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

#[derive(Debug, Clone)]
enum LivenessScript {
    Answer(ProbeResult<()>),
    Hang,
}

#[derive(Debug)]
struct ScriptState {
    probes: RwLock<HashMap<DeviceAddress, ProbeResult<ProbeReport>>>,
    liveness: RwLock<HashMap<DeviceAddress, LivenessScript>>,
    held: watch::Sender<bool>,
    started: watch::Sender<usize>,
}

/// Capability prober that replays scripted outcomes.
///
/// Unscripted addresses are unreachable.
#[derive(Debug, Clone)]
pub struct ScriptedCapabilityProber {
    state: Arc<ScriptState>,
}

impl Default for ScriptedCapabilityProber {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCapabilityProber {
    /// Creates a prober with no scripted devices.
    #[must_use]
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        let (started, _) = watch::channel(0);
        Self {
            state: Arc::new(ScriptState {
                probes: RwLock::new(HashMap::new()),
                liveness: RwLock::new(HashMap::new()),
                held,
                started,
            }),
        }
    }

    /// Sets the result of probing `address`.
    pub fn script_probe(&self, address: DeviceAddress, result: ProbeResult<ProbeReport>) {
        self.state
            .probes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, result);
    }

    /// Sets the result of liveness checks against `address`.
    pub fn script_liveness(&self, address: DeviceAddress, result: ProbeResult<()>) {
        self.state
            .liveness
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, LivenessScript::Answer(result));
    }

    /// Makes liveness checks against `address` never complete.
    pub fn hang_liveness(&self, address: DeviceAddress) {
        self.state
            .liveness
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, LivenessScript::Hang);
    }

    /// Parks every subsequent capability probe until [`Self::release`].
    pub fn hold(&self) {
        self.state.held.send_replace(true);
    }

    /// Lets parked capability probes complete.
    pub fn release(&self) {
        self.state.held.send_replace(false);
    }

    /// Returns how many capability probes have started.
    #[must_use]
    pub fn probes_started(&self) -> usize {
        *self.state.started.borrow()
    }

    /// Waits until at least `count` capability probes have started.
    pub async fn wait_for_probes(&self, count: usize) {
        let mut receiver = self.state.started.subscribe();
        if receiver.wait_for(|started| *started >= count).await.is_err() {
            tracing::warn!("scripted prober counter closed while waiting");
        }
    }
}

#[async_trait]
impl CapabilityProber for ScriptedCapabilityProber {
    async fn probe(
        &self,
        address: &DeviceAddress,
        _credentials: Option<&ProbeCredentials>,
    ) -> ProbeResult<ProbeReport> {
        self.state.started.send_modify(|started| *started += 1);

        let mut held = self.state.held.subscribe();
        if held.wait_for(|is_held| !*is_held).await.is_err() {
            return Err(ProbeError::Unreachable(address.clone()));
        }

        self.state
            .probes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::Unreachable(address.clone())))
    }

    async fn check_liveness(&self, address: &DeviceAddress) -> ProbeResult<()> {
        let script = self
            .state
            .liveness
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned();
        match script {
            Some(LivenessScript::Answer(result)) => result,
            Some(LivenessScript::Hang) => std::future::pending().await,
            None => Err(ProbeError::Unreachable(address.clone())),
        }
    }
}
