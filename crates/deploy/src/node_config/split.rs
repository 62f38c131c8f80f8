//! Per-role node configuration variants.
//!
//! The batch poster, staker and RPC configurations are all derived from the
//! same base configuration by removing the subtrees that do not apply to the
//! role. RPC is derived from the staker variant, so every key of the RPC
//! configuration is also present in the staker configuration.

use serde_json::Value;

/// Validator-only tuning knobs carried over from the default configuration.
const BOLD_STAKER_KEYS: [&[&str]; 2] = [
    &["node", "bold", "strategy"],
    &["node", "bold", "assertion-posting-interval"],
];

/// Paths removed from the base configuration for the batch poster.
const BATCH_POSTER_REMOVALS: [&[&str]; 1] = [&["node", "staker"]];

/// Paths removed from the base configuration for the staker.
const STAKER_REMOVALS: [&[&str]; 5] = [
    &["node", "sequencer"],
    &["node", "delayed-sequencer"],
    &["node", "batch-poster"],
    &["node", "dangerous", "no-sequencer-coordinator"],
    &["execution", "sequencer"],
];

/// Paths removed from the staker configuration for the RPC node.
const RPC_REMOVALS: [&[&str]; 1] = [&["node", "staker"]];

/// The three node configurations derived from a base configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleConfigs {
    pub batch_poster: Value,
    pub staker: Value,
    pub rpc: Value,
}

/// Remove the value at `path`, if present.
///
/// Returns the removed value. Missing intermediate keys or non-object
/// intermediates make this a no-op.
pub fn remove_path(tree: &mut Value, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;

    let mut current = tree;
    for segment in parents {
        current = current.get_mut(*segment)?;
    }

    current.as_object_mut()?.shift_remove(*last)
}

fn strip(tree: &mut Value, paths: &[&[&str]]) {
    for path in paths {
        if remove_path(tree, path).is_some() {
            tracing::trace!(path = %path.join("."), "Removed key from node config");
        }
    }
}

/// Batch poster variant: the base configuration without staking settings.
pub fn batch_poster_config(base: &Value) -> Value {
    let mut config = base.clone();
    strip(&mut config, &BATCH_POSTER_REMOVALS);
    strip(&mut config, &BOLD_STAKER_KEYS);
    config
}

/// Staker variant: the base configuration without sequencing and batch posting.
pub fn staker_config(base: &Value) -> Value {
    let mut config = base.clone();
    strip(&mut config, &STAKER_REMOVALS);
    config
}

/// RPC variant, derived from an already stripped staker configuration.
pub fn rpc_config_from_staker(staker: &Value) -> Value {
    let mut config = staker.clone();
    strip(&mut config, &RPC_REMOVALS);
    strip(&mut config, &BOLD_STAKER_KEYS);
    config
}

/// Split a base node configuration into its per-role variants.
///
/// The base configuration is not modified and none of the returned
/// configurations share data with it.
pub fn split_config_per_type(base: &Value) -> RoleConfigs {
    let batch_poster = batch_poster_config(base);
    let staker = staker_config(base);
    let rpc = rpc_config_from_staker(&staker);

    RoleConfigs {
        batch_poster,
        staker,
        rpc,
    }
}
