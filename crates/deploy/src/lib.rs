//! orbit-deploy - Configuration library for Arbitrum Orbit chains.
//!
//! This crate turns the contracts deployed for a new chain and its operator
//! keys into the configuration files of the chain's nodes: one per node role
//! (batch poster, staker, RPC) plus the DAS server for Anytrust chains.

pub mod chain_config;
pub mod chain_info;
pub mod chains;
pub mod contracts;
pub mod das;
pub mod fs;
pub mod funding;
pub mod keys;
pub mod node_config;
pub mod rpc;

pub use chain_config::{ChainConfig, generate_chain_id, prepare_chain_config};
pub use chain_info::{ChainInfo, RollupInfo};
pub use chains::{
    ChainIdentity, CustomParentChainArgs, KnownParentChain, NativeCurrency, ParentChain,
};
pub use contracts::{CoreContracts, TokenBridgeContracts};
pub use das::{DasNodeConfig, Keyset, prepare_das_config};
pub use fs::{ConfigStore, DEFAULT_CONFIG_ROOT};
pub use keys::{OperatorAccount, OperatorAccounts};
pub use node_config::{
    NodeConfigBuilder, NodeConfigOptions, NodeConfigPaths, NodeConfigPreparer, NodeType,
    PrepareNodeConfigParams, StandardNodeConfig,
};
