//! Then steps for access gate BDD scenarios.

use super::world::AccessWorld;
use rstest_bdd_macros::then;

#[then("the request is allowed")]
fn request_allowed(world: &AccessWorld) -> Result<(), eyre::Report> {
    match &world.last_result {
        Some(Ok(())) => Ok(()),
        other => Err(eyre::eyre!("expected the request to pass, got {other:?}")),
    }
}

#[then(r#"the request is refused with "{message}""#)]
fn request_refused(world: &AccessWorld, message: String) -> Result<(), eyre::Report> {
    match &world.last_result {
        Some(Err(denial)) if denial.to_string() == message => Ok(()),
        other => Err(eyre::eyre!("expected refusal '{message}', got {other:?}")),
    }
}

#[then(r#"the gate records outcome "{outcome}""#)]
fn gate_records_outcome(world: &AccessWorld, outcome: String) -> Result<(), eyre::Report> {
    let observations = world.telemetry.observations();
    let last = observations
        .last()
        .ok_or_else(|| eyre::eyre!("the gate recorded nothing"))?;
    if last.outcome.as_str() != outcome {
        return Err(eyre::eyre!(
            "expected outcome {outcome}, recorded {}",
            last.outcome
        ));
    }
    Ok(())
}
