//! Given steps for access gate BDD scenarios.

use super::world::AccessWorld;
use edge_registry::access::ApiKeySet;
use rstest_bdd_macros::given;
use secrecy::SecretString;

#[given(r#"the gate runs in "{mode}" mode with key "{key}""#)]
fn gate_with_key(world: &mut AccessWorld, mode: String, key: String) -> Result<(), eyre::Report> {
    world.configure(&mode, ApiKeySet::from_keys([key.as_str()]))
}

#[given(r#"the gate runs in "{mode}" mode with allow-list "{list}""#)]
fn gate_with_allow_list(
    world: &mut AccessWorld,
    mode: String,
    list: String,
) -> Result<(), eyre::Report> {
    let keys = ApiKeySet::from_sources(None, Some(&SecretString::from(list)));
    world.configure(&mode, keys)
}

#[given(r#"the gate runs in "{mode}" mode with no keys"#)]
fn gate_without_keys(world: &mut AccessWorld, mode: String) -> Result<(), eyre::Report> {
    world.configure(&mode, ApiKeySet::default())
}
