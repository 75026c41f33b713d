//! Given steps for device discovery BDD scenarios.

use super::world::{DiscoveryWorld, docker_only};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a device at "{ip}" running only a container runtime"#)]
fn device_with_runtime(world: &mut DiscoveryWorld, ip: String) -> Result<(), eyre::Report> {
    world.script(&ip, docker_only())
}

#[given(r#"a registered device at "{ip}""#)]
fn registered_device(world: &mut DiscoveryWorld, ip: String) -> Result<(), eyre::Report> {
    world.script(&ip, docker_only())?;
    world.discover(&ip);
    match world.last_discovery.take() {
        Some(result) => result
            .map(|_| ())
            .wrap_err("register device for scenario"),
        None => Err(eyre::eyre!("discovery did not run")),
    }
}
