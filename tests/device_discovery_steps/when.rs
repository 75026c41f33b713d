//! When steps for device discovery BDD scenarios.

use super::world::{DiscoveryWorld, docker_with_agent, run_async};
use edge_registry::device::ports::{DeviceStore, ProbeError};
use rstest_bdd_macros::when;

#[when(r#"the device at "{ip}" is discovered"#)]
fn device_is_discovered(world: &mut DiscoveryWorld, ip: String) {
    world.discover(&ip);
}

#[when(r#"the device at "{ip}" is discovered again"#)]
fn device_is_rediscovered(world: &mut DiscoveryWorld, ip: String) {
    world.discover(&ip);
}

#[when(r#"the platform agent is deployed on "{ip}""#)]
fn agent_is_deployed(world: &mut DiscoveryWorld, ip: String) -> Result<(), eyre::Report> {
    world.script(&ip, docker_with_agent())
}

#[when("the device stops answering health checks")]
fn device_stops_answering(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let address = world.address()?.clone();
    world
        .prober
        .script_liveness(address.clone(), Err(ProbeError::Unreachable(address)));
    Ok(())
}

#[when("the device answers health checks again")]
fn device_answers_again(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let address = world.address()?.clone();
    world.prober.script_liveness(address, Ok(()));
    std::thread::sleep(std::time::Duration::from_millis(5));
    Ok(())
}

#[when("the health monitor polls")]
fn health_monitor_polls(world: &mut DiscoveryWorld) -> Result<(), eyre::Report> {
    let address = world.address()?.clone();
    let before = run_async(world.store.find_by_ip(&address))?
        .ok_or_else(|| eyre::eyre!("device {address} is not registered"))?;
    world.last_seen_before_poll = before.last_seen();
    run_async(world.monitor.poll_once())?;
    Ok(())
}
