//! Node configuration: defaults, overrides, per-role split and in-place updates.

mod builder;
pub mod merge;
pub mod overrides;
mod prepare;
pub mod split;
mod update;

pub use builder::{
    DEFAULT_GENESIS_RUNTIME_PATH, NodeConfigBuilder, NodeConfigOptions, NodeConfigPaths, parse_port,
};
pub use merge::{deep_merge, merged};
pub use prepare::{
    DEFAULT_HTTP_PORT, NodeConfigPreparer, PrepareNodeConfigParams, StandardNodeConfig,
};
pub use split::{RoleConfigs, split_config_per_type};
pub use update::{NodeConfigUpdate, default_update_patch, update_node_config};

#[cfg(test)]
pub(crate) use prepare::tests as prepare_tests;

/// Kind of component a configuration file belongs to.
///
/// The kebab-case name doubles as the component's directory name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    BatchPoster,
    Staker,
    Rpc,
    DasServer,
}

impl NodeType {
    /// The node roles a split configuration is written for.
    pub const NODE_ROLES: [NodeType; 3] = [NodeType::BatchPoster, NodeType::Staker, NodeType::Rpc];

    pub fn dir_name(&self) -> String {
        self.to_string()
    }

    pub fn config_file_name(&self) -> String {
        match self {
            NodeType::DasServer => "das-config.json".to_string(),
            role => format!("{role}-config.json"),
        }
    }

    pub fn is_node_role(&self) -> bool {
        !matches!(self, NodeType::DasServer)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_node_type_file_names() {
        assert_eq!(NodeType::BatchPoster.dir_name(), "batch-poster");
        assert_eq!(
            NodeType::BatchPoster.config_file_name(),
            "batch-poster-config.json"
        );
        assert_eq!(NodeType::Staker.config_file_name(), "staker-config.json");
        assert_eq!(NodeType::Rpc.config_file_name(), "rpc-config.json");
        assert_eq!(NodeType::DasServer.dir_name(), "das-server");
        assert_eq!(NodeType::DasServer.config_file_name(), "das-config.json");
    }

    #[test]
    fn test_node_type_parses_kebab_case() {
        assert_eq!(
            NodeType::from_str("batch-poster").unwrap(),
            NodeType::BatchPoster
        );
        assert_eq!(NodeType::from_str("rpc").unwrap(), NodeType::Rpc);
        assert!(NodeType::from_str("sequencer").is_err());
        assert!(NodeType::NODE_ROLES.iter().all(NodeType::is_node_role));
    }
}
