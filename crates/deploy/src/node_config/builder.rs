//! Builds the node configuration files of a chain.
//!
//! The builder takes the default configuration produced by a
//! [`NodeConfigPreparer`], applies the operator's overrides in a fixed order,
//! splits the result per node role and writes every variant to the
//! [`ConfigStore`].

use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use super::{
    NodeConfigPreparer, NodeType, PrepareNodeConfigParams, merge::deep_merge, overrides,
    split::split_config_per_type,
};
use crate::fs::{ConfigStore, GENESIS_FILE};

/// Path of the genesis file inside the node container.
pub const DEFAULT_GENESIS_RUNTIME_PATH: &str = "/home/user/.arbitrum/genesis.json";

/// Overrides applied on top of the default node configuration.
///
/// Built once at startup from the operator's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfigOptions {
    pub disable_l1_finality: bool,
    pub use_fast_l1_posting: bool,
    pub use_genesis_file: bool,
    /// Genesis file on the host, distributed to every node directory.
    pub genesis_file: PathBuf,
    /// Where the node reads the genesis file from at runtime.
    pub genesis_runtime_path: String,
    pub nitro_port: Option<u16>,
}

impl NodeConfigOptions {
    /// Options that leave the default configuration untouched.
    pub fn new(store: &ConfigStore) -> Self {
        Self {
            disable_l1_finality: false,
            use_fast_l1_posting: false,
            use_genesis_file: false,
            genesis_file: store.root().join(GENESIS_FILE),
            genesis_runtime_path: DEFAULT_GENESIS_RUNTIME_PATH.to_string(),
            nitro_port: None,
        }
    }
}

/// Parse a listen port, treating an empty value as unset.
pub fn parse_port(value: &str) -> Result<Option<u16>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse()
        .map(Some)
        .with_context(|| format!("Invalid port: {value}"))
}

/// Paths of the per-role configuration files written by [`NodeConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfigPaths {
    pub batch_poster: PathBuf,
    pub staker: PathBuf,
    pub rpc: PathBuf,
}

#[derive(Debug, Clone)]
pub struct NodeConfigBuilder {
    store: ConfigStore,
    options: NodeConfigOptions,
}

impl NodeConfigBuilder {
    pub fn new(store: ConfigStore, options: NodeConfigOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &NodeConfigOptions {
        &self.options
    }

    /// Genesis file content, when requested and present on the host.
    fn load_genesis(&self) -> Result<Option<Vec<u8>>> {
        if !self.options.use_genesis_file {
            return Ok(None);
        }

        match std::fs::read(&self.options.genesis_file) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.options.genesis_file.display(),
                    "Genesis file not found, starting from an empty state"
                );
                Ok(None)
            }
            Err(err) => Err(err).with_context(|| {
                format!(
                    "Failed to read genesis file {}",
                    self.options.genesis_file.display()
                )
            }),
        }
    }

    /// Default configuration with the configured overrides applied.
    pub fn base_config<P: NodeConfigPreparer + ?Sized>(
        &self,
        preparer: &P,
        params: &PrepareNodeConfigParams,
    ) -> Result<Value> {
        let genesis = self.load_genesis()?;
        self.config_with_overrides(preparer, params, genesis.is_some())
    }

    fn config_with_overrides<P: NodeConfigPreparer + ?Sized>(
        &self,
        preparer: &P,
        params: &PrepareNodeConfigParams,
        with_genesis: bool,
    ) -> Result<Value> {
        let mut config = preparer.prepare_node_config(params)?;

        if self.options.disable_l1_finality {
            tracing::info!("Disabling parent chain finality checks");
            deep_merge(&mut config, &overrides::disable_l1_finality());
        }

        if self.options.use_fast_l1_posting {
            tracing::info!(
                interval = overrides::FAST_POSTING_INTERVAL,
                "Using fast parent chain posting"
            );
            deep_merge(&mut config, &overrides::fast_l1_posting());
        }

        if with_genesis {
            tracing::info!(
                path = %self.options.genesis_runtime_path,
                "Initializing chain from genesis file"
            );
            deep_merge(
                &mut config,
                &overrides::genesis_file(&self.options.genesis_runtime_path),
            );
        }

        if let Some(port) = self.options.nitro_port {
            tracing::info!(port, "Overriding node HTTP port");
            deep_merge(&mut config, &overrides::http_port(port));
        }

        Ok(config)
    }

    /// Build and save one configuration per node role.
    pub fn build<P: NodeConfigPreparer + ?Sized>(
        &self,
        preparer: &P,
        params: &PrepareNodeConfigParams,
    ) -> Result<NodeConfigPaths> {
        // The genesis override and the copies come from the same read.
        let genesis = self.load_genesis()?;
        let base = self.config_with_overrides(preparer, params, genesis.is_some())?;
        let roles = split_config_per_type(&base);

        if let Some(content) = &genesis {
            self.store
                .write_genesis_file(content)
                .context("Failed to distribute genesis file")?;
        }

        Ok(NodeConfigPaths {
            batch_poster: self
                .store
                .save_node_config(NodeType::BatchPoster, &roles.batch_poster)?,
            staker: self.store.save_node_config(NodeType::Staker, &roles.staker)?,
            rpc: self.store.save_node_config(NodeType::Rpc, &roles.rpc)?,
        })
    }

    /// Build a single configuration running every role, saved as the RPC configuration.
    pub fn build_single<P: NodeConfigPreparer + ?Sized>(
        &self,
        preparer: &P,
        params: &PrepareNodeConfigParams,
    ) -> Result<PathBuf> {
        let base = self.base_config(preparer, params)?;
        self.store.save_node_config(NodeType::Rpc, &base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_config::prepare_tests::sample_params;
    use serde_json::json;
    use tempdir::TempDir;

    struct FixedPreparer(Value);

    impl NodeConfigPreparer for FixedPreparer {
        fn prepare_node_config(&self, _params: &PrepareNodeConfigParams) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    /// Deletes the genesis file while preparing the defaults.
    struct GenesisRemovingPreparer(PathBuf);

    impl NodeConfigPreparer for GenesisRemovingPreparer {
        fn prepare_node_config(&self, params: &PrepareNodeConfigParams) -> Result<Value> {
            std::fs::remove_file(&self.0)?;
            defaults().prepare_node_config(params)
        }
    }

    struct FailingPreparer;

    impl NodeConfigPreparer for FailingPreparer {
        fn prepare_node_config(&self, _params: &PrepareNodeConfigParams) -> Result<Value> {
            anyhow::bail!("sdk unavailable")
        }
    }

    fn defaults() -> FixedPreparer {
        FixedPreparer(json!({
            "http": {"addr": "0.0.0.0", "port": 8449},
            "node": {
                "sequencer": true,
                "batch-poster": {"enable": true, "max-delay": "1h"},
                "staker": {"enable": true}
            },
            "execution": {"sequencer": {"enable": true}}
        }))
    }

    fn builder(
        temp_dir: &TempDir,
        configure: impl FnOnce(&mut NodeConfigOptions),
    ) -> NodeConfigBuilder {
        let store = ConfigStore::new(temp_dir.path().join("chainConfig"));
        let mut options = NodeConfigOptions::new(&store);
        configure(&mut options);
        NodeConfigBuilder::new(store, options)
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("").unwrap(), None);
        assert_eq!(parse_port("   ").unwrap(), None);
        assert_eq!(parse_port("8547").unwrap(), Some(8547));
        assert_eq!(parse_port(" 9000 ").unwrap(), Some(9000));
        assert!(parse_port("http").is_err());
        assert!(parse_port("70000").is_err());
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let builder = builder(&temp_dir, |_| {});

        let config = builder.base_config(&defaults(), &sample_params(false)).unwrap();
        assert_eq!(config, defaults().0);
    }

    #[test]
    fn test_overrides_are_applied() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let builder = builder(&temp_dir, |options| {
            options.disable_l1_finality = true;
            options.use_fast_l1_posting = true;
            options.nitro_port = Some(8547);
        });

        let config = builder.base_config(&defaults(), &sample_params(false)).unwrap();

        assert_eq!(config["http"]["port"], json!(8547));
        assert_eq!(config["http"]["addr"], json!("0.0.0.0"));
        assert_eq!(config["node"]["batch-poster"]["max-delay"], json!("1m"));
        assert_eq!(config["node"]["batch-poster"]["enable"], json!(true));
        assert_eq!(
            config["node"]["batch-poster"]["data-poster"]["wait-for-l1-finality"],
            json!(false)
        );
        assert_eq!(config["node"]["staker"]["make-assertion-interval"], json!("1m"));
        assert!(config.get("init").is_none());
    }

    #[test]
    fn test_port_override_creates_http_section() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let builder = builder(&temp_dir, |options| options.nitro_port = Some(9000));

        let config = builder
            .base_config(&FixedPreparer(json!({"node": {}})), &sample_params(false))
            .unwrap();
        assert_eq!(config["http"], json!({"port": 9000}));
    }

    #[test]
    fn test_genesis_override_requires_existing_file() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let genesis = temp_dir.path().join("genesis.json");
        let builder = builder(&temp_dir, |options| {
            options.use_genesis_file = true;
            options.genesis_file = genesis.clone();
        });

        let config = builder.base_config(&defaults(), &sample_params(false)).unwrap();
        assert!(config.get("init").is_none());

        std::fs::write(&genesis, "{}").unwrap();
        let config = builder.base_config(&defaults(), &sample_params(false)).unwrap();
        assert_eq!(
            config["init"],
            json!({"genesis-json-file": "/home/user/.arbitrum/genesis.json", "empty": false})
        );
    }

    #[test]
    fn test_build_writes_split_configs() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let genesis = temp_dir.path().join("genesis.json");
        std::fs::write(&genesis, "{}").unwrap();
        let builder = builder(&temp_dir, |options| {
            options.use_genesis_file = true;
            options.genesis_file = genesis.clone();
        });

        let paths = builder.build(&defaults(), &sample_params(false)).unwrap();

        let batch_poster: Value = ConfigStore::read_json(&paths.batch_poster).unwrap();
        let staker: Value = ConfigStore::read_json(&paths.staker).unwrap();
        let rpc: Value = ConfigStore::read_json(&paths.rpc).unwrap();

        assert!(batch_poster["node"].get("staker").is_none());
        assert_eq!(batch_poster["node"]["sequencer"], json!(true));
        assert!(staker["node"].get("sequencer").is_none());
        assert!(staker["node"].get("batch-poster").is_none());
        assert_eq!(staker["node"]["staker"]["enable"], json!(true));
        assert_eq!(rpc["node"], json!({}));
        assert_eq!(rpc["execution"], json!({}));

        for path in [&paths.batch_poster, &paths.staker, &paths.rpc] {
            assert!(path.with_file_name("genesis.json").is_file());
        }
    }

    #[test]
    fn test_build_reads_genesis_once() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let genesis = temp_dir.path().join("genesis.json");
        std::fs::write(&genesis, r#"{"alloc": {}}"#).unwrap();
        let builder = builder(&temp_dir, |options| {
            options.use_genesis_file = true;
            options.genesis_file = genesis.clone();
        });

        let paths = builder
            .build(&GenesisRemovingPreparer(genesis.clone()), &sample_params(false))
            .unwrap();

        assert!(!genesis.exists());
        for path in [&paths.batch_poster, &paths.staker, &paths.rpc] {
            let config: Value = ConfigStore::read_json(path).unwrap();
            assert_eq!(config["init"]["empty"], json!(false));
            assert_eq!(
                std::fs::read_to_string(path.with_file_name("genesis.json")).unwrap(),
                r#"{"alloc": {}}"#
            );
        }
    }

    #[test]
    fn test_build_with_genesis_inside_role_directory() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let store = ConfigStore::new(temp_dir.path().join("chainConfig"));
        let genesis = store.genesis_path(NodeType::Staker);
        std::fs::create_dir_all(genesis.parent().unwrap()).unwrap();
        std::fs::write(&genesis, r#"{"alloc": {}}"#).unwrap();
        let builder = builder(&temp_dir, |options| {
            options.use_genesis_file = true;
            options.genesis_file = genesis.clone();
        });

        builder.build(&defaults(), &sample_params(false)).unwrap();

        for node_type in NodeType::NODE_ROLES {
            assert_eq!(
                std::fs::read_to_string(store.genesis_path(node_type)).unwrap(),
                r#"{"alloc": {}}"#
            );
        }
    }

    #[test]
    fn test_build_single_saves_unsplit_rpc_config() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let builder = builder(&temp_dir, |_| {});

        let path = builder.build_single(&defaults(), &sample_params(false)).unwrap();
        assert!(path.ends_with("rpc/rpc-config.json"));
        assert_eq!(ConfigStore::read_json::<Value>(&path).unwrap(), defaults().0);
        assert!(!path.parent().unwrap().parent().unwrap().join("staker").exists());
    }

    #[test]
    fn test_preparer_failure_propagates() {
        let temp_dir = TempDir::new("orbit-test").unwrap();
        let builder = builder(&temp_dir, |_| {});

        let err = builder.build(&FailingPreparer, &sample_params(false)).unwrap_err();
        assert_eq!(err.to_string(), "sdk unavailable");
        assert!(!temp_dir.path().join("chainConfig").exists());
    }
}
