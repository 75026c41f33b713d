//! When steps for access gate BDD scenarios.

use super::world::AccessWorld;
use rstest_bdd_macros::when;

fn evaluate(world: &mut AccessWorld, key: Option<&str>) -> Result<(), eyre::Report> {
    let gate = world
        .gate
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no gate configured in scenario world"))?;
    world.last_result = Some(gate.evaluate(key));
    Ok(())
}

#[when("a request presents no key")]
fn request_without_key(world: &mut AccessWorld) -> Result<(), eyre::Report> {
    evaluate(world, None)
}

#[when(r#"a request presents key "{key}""#)]
fn request_with_key(world: &mut AccessWorld, key: String) -> Result<(), eyre::Report> {
    evaluate(world, Some(key.as_str()))
}
