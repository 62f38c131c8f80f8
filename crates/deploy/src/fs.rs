//! File system layout of the generated chain configuration.

use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    chain_config::ChainConfig,
    contracts::{CoreContracts, TokenBridgeContracts},
    das::DasNodeConfig,
    node_config::NodeType,
};

/// Default directory the configuration files are written to.
pub const DEFAULT_CONFIG_ROOT: &str = "chainConfig";

pub const CORE_CONTRACTS_FILE: &str = "core-contracts.json";
pub const TOKEN_BRIDGE_CONTRACTS_FILE: &str = "token-bridge-contracts.json";
pub const CHAIN_CONFIG_FILE: &str = "chain-config.json";
pub const GENESIS_FILE: &str = "genesis.json";

/// Reads and writes the configuration files under a root directory.
///
/// ```text
/// <root>/
///   batch-poster/batch-poster-config.json
///   staker/staker-config.json
///   rpc/rpc-config.json
///   das-server/das-config.json
///   core-contracts.json
///   token-bridge-contracts.json
///   chain-config.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    root: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_ROOT)
    }
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn node_dir(&self, node_type: NodeType) -> PathBuf {
        self.root.join(node_type.dir_name())
    }

    pub fn node_config_path(&self, node_type: NodeType) -> PathBuf {
        self.node_dir(node_type).join(node_type.config_file_name())
    }

    pub fn core_contracts_path(&self) -> PathBuf {
        self.root.join(CORE_CONTRACTS_FILE)
    }

    pub fn token_bridge_contracts_path(&self) -> PathBuf {
        self.root.join(TOKEN_BRIDGE_CONTRACTS_FILE)
    }

    pub fn chain_config_path(&self) -> PathBuf {
        self.root.join(CHAIN_CONFIG_FILE)
    }

    pub fn genesis_path(&self, node_type: NodeType) -> PathBuf {
        self.node_dir(node_type).join(GENESIS_FILE)
    }

    /// Create a directory (and its parents) if it doesn't exist.
    pub fn create_dir(path: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        tracing::trace!(path = %path.display(), "Created directory");
        Ok(())
    }

    /// Write pretty-printed JSON to `path`, replacing any existing file.
    ///
    /// The content goes to a temporary sibling first and is renamed into place,
    /// so readers never see a partially written file.
    pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            Self::create_dir(parent)?;
        }

        let content =
            serde_json::to_string_pretty(value).context("Failed to serialize configuration")?;
        Self::replace_file(path, content.as_bytes())?;

        tracing::debug!(path = %path.display(), "Configuration written");
        Ok(())
    }

    fn replace_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let file_name = path
            .file_name()
            .with_context(|| format!("Invalid file path {}", path.display()))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move {} into place", path.display()))
    }

    pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_node_config(&self, node_type: NodeType, config: &Value) -> anyhow::Result<PathBuf> {
        let path = self.node_config_path(node_type);
        Self::write_json(&path, config)?;
        tracing::info!(node_type = %node_type, path = %path.display(), "Node configuration saved");
        Ok(path)
    }

    pub fn read_node_config(&self, node_type: NodeType) -> anyhow::Result<Value> {
        Self::read_json(&self.node_config_path(node_type))
            .with_context(|| format!("Failed to load {node_type} configuration"))
    }

    /// Copy the current configuration of `node_type` to `<unix-ts>-<file>` next to it.
    ///
    /// Existing backups are never overwritten: when the name is taken a counter
    /// is added, as in `<unix-ts>-1-<file>`.
    pub fn backup_node_config(&self, node_type: NodeType) -> anyhow::Result<PathBuf> {
        let path = self.node_config_path(node_type);
        let content = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let timestamp = chrono::Utc::now().timestamp();
        let file_name = node_type.config_file_name();
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{timestamp}-{file_name}"),
                n => format!("{timestamp}-{n}-{file_name}"),
            };
            let backup = self.node_dir(node_type).join(name);

            match OpenOptions::new().write(true).create_new(true).open(&backup) {
                Ok(mut file) => {
                    file.write_all(&content).with_context(|| {
                        format!(
                            "Failed to back up {} to {}",
                            path.display(),
                            backup.display()
                        )
                    })?;
                    tracing::info!(backup = %backup.display(), "Backed up node configuration");
                    return Ok(backup);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to create {}", backup.display()));
                }
            }
        }
    }

    pub fn save_das_config(&self, config: &DasNodeConfig) -> anyhow::Result<PathBuf> {
        let path = self.node_config_path(NodeType::DasServer);
        Self::write_json(&path, config)?;
        tracing::info!(path = %path.display(), "DAS configuration saved");
        Ok(path)
    }

    pub fn read_das_config(&self) -> anyhow::Result<DasNodeConfig> {
        Self::read_json(&self.node_config_path(NodeType::DasServer))
    }

    pub fn save_core_contracts(&self, contracts: &CoreContracts) -> anyhow::Result<PathBuf> {
        let path = self.core_contracts_path();
        Self::write_json(&path, contracts)?;
        Ok(path)
    }

    pub fn read_core_contracts(&self) -> anyhow::Result<CoreContracts> {
        Self::read_json(&self.core_contracts_path()).context("Failed to load core contracts")
    }

    pub fn save_token_bridge_contracts(
        &self,
        contracts: &TokenBridgeContracts,
    ) -> anyhow::Result<PathBuf> {
        let path = self.token_bridge_contracts_path();
        Self::write_json(&path, contracts)?;
        Ok(path)
    }

    pub fn read_token_bridge_contracts(&self) -> anyhow::Result<TokenBridgeContracts> {
        Self::read_json(&self.token_bridge_contracts_path())
    }

    pub fn save_chain_config(&self, config: &ChainConfig) -> anyhow::Result<PathBuf> {
        let path = self.chain_config_path();
        Self::write_json(&path, config)?;
        tracing::info!(chain_id = config.chain_id, path = %path.display(), "Chain configuration saved");
        Ok(path)
    }

    pub fn read_chain_config(&self) -> anyhow::Result<ChainConfig> {
        Self::read_json(&self.chain_config_path()).context("Failed to load chain configuration")
    }

    /// Copy the genesis file into the directory of every node role.
    ///
    /// A missing source file is not an error: nothing is copied and an empty
    /// list is returned.
    pub fn distribute_genesis_file(&self, source: &Path) -> anyhow::Result<Vec<PathBuf>> {
        if !source.is_file() {
            tracing::warn!(
                path = %source.display(),
                "Genesis file not found, skipping distribution"
            );
            return Ok(Vec::new());
        }

        let content = std::fs::read(source)
            .with_context(|| format!("Failed to read genesis file {}", source.display()))?;
        self.write_genesis_file(&content)
    }

    /// Write the genesis file into the directory of every node role.
    ///
    /// The content is held in memory, so the source may be one of the destinations.
    pub fn write_genesis_file(&self, content: &[u8]) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(NodeType::NODE_ROLES.len());
        for node_type in NodeType::NODE_ROLES {
            Self::create_dir(&self.node_dir(node_type))?;
            let destination = self.genesis_path(node_type);
            Self::replace_file(&destination, content).with_context(|| {
                format!("Failed to copy genesis file to {}", destination.display())
            })?;
            tracing::debug!(path = %destination.display(), "Genesis file copied");
            written.push(destination);
        }

        Ok(written)
    }
}
