//! Then steps for device discovery BDD scenarios.

use super::world::{DiscoveryWorld, run_async};
use edge_registry::device::{
    domain::{DeviceRecord, DeviceStatus, DeviceType},
    ports::DeviceStore,
    services::DiscoveryError,
};
use rstest_bdd_macros::then;

fn current_record(world: &DiscoveryWorld) -> Result<DeviceRecord, eyre::Report> {
    let address = world.address()?;
    run_async(world.store.find_by_ip(address))?
        .ok_or_else(|| eyre::eyre!("device {address} is not registered"))
}

#[then(r#"the device is classified as "{device_type}""#)]
fn device_is_classified(world: &DiscoveryWorld, device_type: String) -> Result<(), eyre::Report> {
    let expected = DeviceType::try_from(device_type.as_str())
        .map_err(|err| eyre::eyre!("invalid expected type in scenario: {err}"))?;
    let record = current_record(world)?;
    if record.device_type() != expected {
        return Err(eyre::eyre!(
            "expected type {expected}, found {}",
            record.device_type()
        ));
    }
    Ok(())
}

#[then(r#"the device status is "{status}""#)]
fn device_status_is(world: &DiscoveryWorld, status: String) -> Result<(), eyre::Report> {
    let expected = DeviceStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let record = current_record(world)?;
    if record.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            record.status()
        ));
    }
    Ok(())
}

#[then("the device keeps its original id")]
fn device_keeps_id(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    let record = current_record(world)?;
    if world.first_id != Some(record.id()) {
        return Err(eyre::eyre!(
            "expected id {:?}, found {}",
            world.first_id,
            record.id()
        ));
    }
    Ok(())
}

#[then("the registry holds {count:usize} devices")]
fn registry_holds(world: &DiscoveryWorld, count: usize) -> Result<(), eyre::Report> {
    let devices = run_async(world.store.list())?;
    if devices.len() != count {
        return Err(eyre::eyre!(
            "expected {count} devices, found {}",
            devices.len()
        ));
    }
    Ok(())
}

#[then("discovery fails because the device is unreachable")]
fn discovery_unreachable(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_discovery
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing discovery result in scenario world"))?;
    if !matches!(result, Err(DiscoveryError::Unreachable { .. })) {
        return Err(eyre::eyre!("expected unreachable error, got {result:?}"));
    }
    Ok(())
}

#[then("the last seen time is unchanged")]
fn last_seen_unchanged(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    let record = current_record(world)?;
    if record.last_seen() != world.last_seen_before_poll {
        return Err(eyre::eyre!(
            "last seen moved from {:?} to {:?}",
            world.last_seen_before_poll,
            record.last_seen()
        ));
    }
    Ok(())
}

#[then("the last seen time has advanced")]
fn last_seen_advanced(world: &DiscoveryWorld) -> Result<(), eyre::Report> {
    let record = current_record(world)?;
    if record.last_seen() <= world.last_seen_before_poll {
        return Err(eyre::eyre!(
            "last seen did not advance past {:?}",
            world.last_seen_before_poll
        ));
    }
    Ok(())
}
