//! In-place update of a persisted node configuration.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::{Value, json};

use super::{NodeType, merge::deep_merge};
use crate::fs::ConfigStore;

/// Result of [`update_node_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfigUpdate {
    pub path: PathBuf,
    /// Copy of the configuration as it was before the update.
    pub backup: PathBuf,
}

/// Patch applied when no patch file is given: turn the node into an archive node.
pub fn default_update_patch() -> Value {
    json!({
        "execution": {
            "caching": {
                "archive": true
            }
        }
    })
}

/// Back up the configuration of `node_type`, merge `patch` into it and save it.
pub fn update_node_config(
    store: &ConfigStore,
    node_type: NodeType,
    patch: &Value,
) -> Result<NodeConfigUpdate> {
    let mut config = store.read_node_config(node_type)?;
    let backup = store.backup_node_config(node_type)?;

    deep_merge(&mut config, patch);
    let path = store.save_node_config(node_type, &config)?;

    tracing::info!(
        node_type = %node_type,
        path = %path.display(),
        backup = %backup.display(),
        "Node configuration updated"
    );

    Ok(NodeConfigUpdate { path, backup })
}
