//! Nitro chain configuration for a new chain.

use alloy_core::primitives::{Address, B256};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default ArbOS version a new chain starts with.
pub const DEFAULT_INITIAL_ARBOS_VERSION: u64 = 32;
/// Maximum deployed contract code size, in bytes.
pub const DEFAULT_MAX_CODE_SIZE: u64 = 24_576;
/// Maximum init code size, in bytes.
pub const DEFAULT_MAX_INIT_CODE_SIZE: u64 = 49_152;

/// Range new chain ids are drawn from by [`generate_chain_id`].
const GENERATED_CHAIN_ID_RANGE: std::ops::RangeInclusive<u64> = 10_000_000_000..=99_999_999_999;

/// Arbitrum-specific chain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArbitrumChainParams {
    #[serde(rename = "EnableArbOS")]
    pub enable_arb_os: bool,
    pub allow_debug_precompiles: bool,
    pub data_availability_committee: bool,
    #[serde(rename = "InitialArbOSVersion")]
    pub initial_arb_os_version: u64,
    pub initial_chain_owner: Address,
    pub genesis_block_num: u64,
    #[serde(default = "default_max_code_size")]
    pub max_code_size: u64,
    #[serde(default = "default_max_init_code_size")]
    pub max_init_code_size: u64,
}

fn default_max_code_size() -> u64 {
    DEFAULT_MAX_CODE_SIZE
}

fn default_max_init_code_size() -> u64 {
    DEFAULT_MAX_INIT_CODE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CliqueParams {
    pub period: u64,
    pub epoch: u64,
}

/// Chain configuration as embedded in the node's `chain.info-json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    pub homestead_block: u64,
    pub dao_fork_block: Option<u64>,
    pub dao_fork_support: bool,
    pub eip150_block: u64,
    pub eip150_hash: B256,
    pub eip155_block: u64,
    pub eip158_block: u64,
    pub byzantium_block: u64,
    pub constantinople_block: u64,
    pub petersburg_block: u64,
    pub istanbul_block: u64,
    pub muir_glacier_block: u64,
    pub berlin_block: u64,
    pub london_block: u64,
    #[serde(default)]
    pub clique: CliqueParams,
    pub arbitrum: ArbitrumChainParams,
}

impl ChainConfig {
    /// Whether the chain posts data to a data availability committee (Anytrust).
    pub fn is_anytrust(&self) -> bool {
        self.arbitrum.data_availability_committee
    }
}

/// Prepare the chain configuration for a new chain with all forks active at genesis.
pub fn prepare_chain_config(
    chain_id: u64,
    initial_chain_owner: Address,
    data_availability_committee: bool,
) -> ChainConfig {
    ChainConfig {
        chain_id,
        homestead_block: 0,
        dao_fork_block: None,
        dao_fork_support: true,
        eip150_block: 0,
        eip150_hash: B256::ZERO,
        eip155_block: 0,
        eip158_block: 0,
        byzantium_block: 0,
        constantinople_block: 0,
        petersburg_block: 0,
        istanbul_block: 0,
        muir_glacier_block: 0,
        berlin_block: 0,
        london_block: 0,
        clique: CliqueParams::default(),
        arbitrum: ArbitrumChainParams {
            enable_arb_os: true,
            allow_debug_precompiles: false,
            data_availability_committee,
            initial_arb_os_version: DEFAULT_INITIAL_ARBOS_VERSION,
            initial_chain_owner,
            genesis_block_num: 0,
            max_code_size: DEFAULT_MAX_CODE_SIZE,
            max_init_code_size: DEFAULT_MAX_INIT_CODE_SIZE,
        },
    }
}

/// Generate a random chain id for a new chain.
pub fn generate_chain_id() -> u64 {
    rand::rng().random_range(GENERATED_CHAIN_ID_RANGE)
}
