use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::{ArgAction, Args, Parser, Subcommand};
use orbit_deploy::{
    ConfigStore, CustomParentChainArgs, DEFAULT_CONFIG_ROOT, NodeConfigOptions, NodeType,
    OperatorAccounts, ParentChain,
    fs::GENESIS_FILE,
    funding::DEFAULT_FUNDING_AMOUNT,
    node_config::{DEFAULT_GENESIS_RUNTIME_PATH, DEFAULT_HTTP_PORT, parse_port},
};
use tracing::level_filters::LevelFilter;

/// The default parent chain (Arbitrum Sepolia).
const DEFAULT_PARENT_CHAIN_ID: u64 = 421_614;

#[derive(Parser)]
#[command(name = "orbit-setup")]
#[command(
    author,
    version,
    about = "Prepare the configuration of an Arbitrum Orbit chain and its nodes"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "ORBIT_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Directory the configuration files are read from and written to.
    #[arg(long, global = true, env = "CHAIN_CONFIG_FOLDER", default_value = DEFAULT_CONFIG_ROOT)]
    pub config_folder: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(&self.config_folder)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the chain configuration of a new chain.
    PrepareChainConfig(PrepareChainConfigArgs),
    /// Build the node configuration files from the deployed core contracts.
    PrepareNodeConfig(PrepareNodeConfigArgs),
    /// Merge a patch into an existing node configuration, keeping a backup.
    UpdateNodeConfig(UpdateNodeConfigArgs),
    /// Write the DAS server configuration of an Anytrust chain.
    DasConfig(DasConfigArgs),
    /// Show the identity of the deployed chain.
    ChainInfo(ChainInfoArgs),
    /// Show the operator accounts.
    Accounts(AccountsArgs),
    /// Check that the operator accounts are funded on the parent chain.
    CheckFunding(CheckFundingArgs),
}

/// Parent chain selection.
///
/// Chains that aren't supported out of the box need the RPC URL, rollup
/// creator, WETH address and maximum data size to be set.
#[derive(Debug, Clone, Args)]
pub struct ParentChainArgs {
    /// Chain id of the parent chain.
    #[arg(long, env = "PARENT_CHAIN_ID", default_value_t = DEFAULT_PARENT_CHAIN_ID)]
    pub parent_chain_id: u64,

    /// RPC endpoint of the parent chain. Defaults to the chain's public endpoint.
    #[arg(long, env = "PARENT_CHAIN_RPC_URL")]
    pub parent_chain_rpc_url: Option<String>,

    /// Rollup creator factory on a custom parent chain.
    #[arg(long, env = "ROLLUPCREATOR_FACTORY_ADDRESS")]
    pub rollup_creator: Option<Address>,

    /// Token bridge creator factory on a custom parent chain.
    #[arg(long, env = "TOKENBRIDGECREATOR_FACTORY_ADDRESS")]
    pub token_bridge_creator: Option<Address>,

    /// WETH on a custom parent chain.
    #[arg(long, env = "WETH_ADDRESS")]
    pub weth: Option<Address>,

    /// Maximum data size of a custom parent chain.
    #[arg(long, env = "CHAIN_MAX_DATA_SIZE")]
    pub max_data_size: Option<u64>,
}

impl ParentChainArgs {
    pub fn resolve(&self) -> anyhow::Result<ParentChain> {
        ParentChain::resolve(
            self.parent_chain_id,
            &CustomParentChainArgs {
                rpc_url: self.parent_chain_rpc_url.clone(),
                rollup_creator: self.rollup_creator,
                weth: self.weth,
                max_data_size: self.max_data_size,
                token_bridge_creator: self.token_bridge_creator,
            },
        )
    }

    pub fn rpc_url(&self, parent_chain: &ParentChain) -> String {
        parent_chain.rpc_url(self.parent_chain_rpc_url.as_deref())
    }
}

/// Operator private keys. Missing batch poster and staker keys are generated.
#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    #[arg(long, env = "CHAIN_OWNER_PRIVATE_KEY", hide_env_values = true)]
    pub chain_owner_private_key: Option<String>,

    #[arg(long, env = "BATCH_POSTER_PRIVATE_KEY", hide_env_values = true)]
    pub batch_poster_private_key: Option<String>,

    #[arg(long, env = "STAKER_PRIVATE_KEY", hide_env_values = true)]
    pub staker_private_key: Option<String>,
}

impl KeyArgs {
    /// Whether both operator keys are given. Empty values don't count.
    pub fn has_operator_keys(&self) -> bool {
        let is_set =
            |key: &Option<String>| key.as_deref().is_some_and(|key| !key.trim().is_empty());
        is_set(&self.batch_poster_private_key) && is_set(&self.staker_private_key)
    }

    pub fn accounts(&self) -> anyhow::Result<OperatorAccounts> {
        OperatorAccounts::load(
            self.chain_owner_private_key.as_deref(),
            self.batch_poster_private_key.as_deref(),
            self.staker_private_key.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct PrepareChainConfigArgs {
    /// Chain id of the new chain. Generated randomly if not provided.
    #[arg(long, env = "ORBIT_CHAIN_ID")]
    pub orbit_chain_id: Option<u64>,

    /// Private key of the chain owner, which becomes the initial chain owner.
    #[arg(long, env = "CHAIN_OWNER_PRIVATE_KEY", hide_env_values = true)]
    pub chain_owner_private_key: String,

    /// Create an Anytrust chain instead of a rollup.
    #[arg(long, env = "USE_ANYTRUST")]
    pub use_anytrust: bool,
}

/// Overrides applied on top of the default node configuration.
#[derive(Debug, Clone, Args)]
pub struct NodeOptionArgs {
    /// Don't wait for parent chain finality.
    #[arg(long, env = "DISABLE_L1_FINALITY")]
    pub disable_l1_finality: bool,

    /// Post batches and assertions every minute.
    #[arg(long, env = "USE_FAST_L1_POSTING")]
    pub use_fast_l1_posting: bool,

    /// Initialize the chain from a genesis file.
    #[arg(long, env = "USE_GENESIS_FILE")]
    pub use_genesis_file: bool,

    /// Genesis file to distribute to the nodes. Defaults to `<config-folder>/genesis.json`.
    #[arg(long, env = "GENESIS_FILE_PATH")]
    pub genesis_file_path: Option<PathBuf>,

    /// Genesis file path as seen by the node.
    #[arg(long, default_value = DEFAULT_GENESIS_RUNTIME_PATH)]
    pub genesis_runtime_path: String,

    /// HTTP port of the nodes. Empty keeps the default.
    #[arg(long, env = "NITRO_PORT")]
    pub nitro_port: Option<String>,
}

impl NodeOptionArgs {
    pub fn to_options(&self, store: &ConfigStore) -> anyhow::Result<NodeConfigOptions> {
        let nitro_port = match &self.nitro_port {
            Some(port) => parse_port(port)?,
            None => None,
        };

        Ok(NodeConfigOptions {
            disable_l1_finality: self.disable_l1_finality,
            use_fast_l1_posting: self.use_fast_l1_posting,
            use_genesis_file: self.use_genesis_file,
            genesis_file: self
                .genesis_file_path
                .clone()
                .unwrap_or_else(|| store.root().join(GENESIS_FILE)),
            genesis_runtime_path: self.genesis_runtime_path.clone(),
            nitro_port,
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct PrepareNodeConfigArgs {
    #[command(flatten)]
    pub parent_chain: ParentChainArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub node_options: NodeOptionArgs,

    /// Name of the chain.
    #[arg(long, env = "ORBIT_CHAIN_NAME", default_value = "My Orbit chain")]
    pub chain_name: String,

    /// Beacon endpoint, used when the parent chain is an Ethereum L1.
    #[arg(long, env = "PARENT_CHAIN_BEACON_RPC_URL")]
    pub parent_chain_beacon_rpc_url: Option<String>,

    /// Stake token of the rollup. Defaults to the WETH address, or the native currency.
    #[arg(long)]
    pub stake_token: Option<Address>,

    /// Write one configuration per node role. Otherwise a single RPC
    /// configuration running every role is written.
    #[arg(long, env = "SPLIT_NODES", default_value_t = false, action = ArgAction::Set)]
    pub split_nodes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateNodeConfigArgs {
    /// Configuration to update.
    #[arg(long, default_value_t = NodeType::Rpc)]
    pub node_type: NodeType,

    /// JSON file merged into the configuration. Defaults to enabling archive mode.
    #[arg(long)]
    pub patch: Option<PathBuf>,

    /// Don't ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DasConfigArgs {
    #[command(flatten)]
    pub parent_chain: ParentChainArgs,
}

/// Where the chain's RPC node is served.
#[derive(Debug, Clone, Args)]
pub struct NitroEndpointArgs {
    #[arg(long, env = "NITRO_RPC_URL", default_value = "http://localhost")]
    pub nitro_rpc_url: String,

    #[arg(long, env = "NITRO_PORT")]
    pub nitro_port: Option<String>,

    #[arg(long, env = "BLOCK_EXPLORER_URL")]
    pub block_explorer_url: Option<String>,
}

impl NitroEndpointArgs {
    pub fn port(&self) -> anyhow::Result<u16> {
        let port = match &self.nitro_port {
            Some(port) => parse_port(port)?,
            None => None,
        };
        Ok(port.unwrap_or(DEFAULT_HTTP_PORT))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ChainInfoArgs {
    #[command(flatten)]
    pub endpoint: NitroEndpointArgs,
}

#[derive(Debug, Clone, Args)]
pub struct AccountsArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    /// Also print the private keys.
    #[arg(long)]
    pub show_private_keys: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CheckFundingArgs {
    #[command(flatten)]
    pub parent_chain: ParentChainArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// Amount of ether each account should hold.
    #[arg(long, env = "FUNDING_AMOUNT", default_value = DEFAULT_FUNDING_AMOUNT)]
    pub funding_amount: String,

    /// Wait until every account is funded.
    #[arg(long)]
    pub wait: bool,

    /// Seconds between balance checks when waiting.
    #[arg(long, default_value_t = 30)]
    pub poll_interval: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_node_config_args() {
        let cli = Cli::try_parse_from([
            "orbit-setup",
            "update-node-config",
            "--node-type",
            "staker",
            "--yes",
        ])
        .unwrap();

        let Command::UpdateNodeConfig(args) = cli.command else {
            panic!("expected update-node-config");
        };
        assert_eq!(args.node_type, NodeType::Staker);
        assert!(args.yes);
        assert!(args.patch.is_none());
    }

    #[test]
    fn test_operator_keys_must_be_non_empty() {
        let keys = |batch_poster: Option<&str>, staker: Option<&str>| KeyArgs {
            chain_owner_private_key: None,
            batch_poster_private_key: batch_poster.map(str::to_string),
            staker_private_key: staker.map(str::to_string),
        };
        let key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

        assert!(keys(Some(key), Some(key)).has_operator_keys());
        assert!(!keys(None, Some(key)).has_operator_keys());
        assert!(!keys(Some(""), Some(key)).has_operator_keys());
        assert!(!keys(Some(key), Some("   ")).has_operator_keys());
    }

    #[test]
    fn test_split_nodes_must_be_enabled() {
        let cli = Cli::try_parse_from(["orbit-setup", "prepare-node-config"]).unwrap();
        let Command::PrepareNodeConfig(args) = cli.command else {
            panic!("expected prepare-node-config");
        };
        assert!(!args.split_nodes);

        let cli = Cli::try_parse_from([
            "orbit-setup",
            "prepare-node-config",
            "--split-nodes",
            "true",
            "--nitro-port",
            "",
        ])
        .unwrap();

        let Command::PrepareNodeConfig(args) = cli.command else {
            panic!("expected prepare-node-config");
        };
        assert!(args.split_nodes);

        let store = ConfigStore::new("chainConfig");
        let options = args.node_options.to_options(&store).unwrap();
        assert_eq!(options.nitro_port, None);
        assert_eq!(options.genesis_file, PathBuf::from("chainConfig/genesis.json"));
    }
}
