//! Identity of a deployed chain, read back from its node configuration.

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    chain_config::ChainConfig,
    chains::{ChainIdentity, NativeCurrency},
};

/// Rollup contract addresses recorded in `chain.info-json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RollupInfo {
    pub bridge: Address,
    pub inbox: Address,
    pub sequencer_inbox: Address,
    pub rollup: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_utils: Option<Address>,
    pub validator_wallet_creator: Address,
    pub stake_token: Address,
    pub deployed_at: u64,
}

/// First entry of a node's `chain.info-json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainInfo {
    pub chain_id: u64,
    pub parent_chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_chain_is_arbitrum: Option<bool>,
    pub chain_name: String,
    pub chain_config: ChainConfig,
    pub rollup: RollupInfo,
}

impl ChainInfo {
    pub fn from_node_config(config: &Value) -> Result<Self> {
        let info_json = config
            .pointer("/chain/info-json")
            .and_then(Value::as_str)
            .context("Node configuration has no chain.info-json")?;

        let mut entries: Vec<ChainInfo> =
            serde_json::from_str(info_json).context("Failed to parse chain.info-json")?;

        if entries.is_empty() {
            anyhow::bail!("chain.info-json has no entries");
        }

        Ok(entries.swap_remove(0))
    }

    pub fn is_anytrust(&self) -> bool {
        self.chain_config.is_anytrust()
    }

    pub fn stake_token(&self) -> Address {
        self.rollup.stake_token
    }
}

impl ChainIdentity {
    /// Identity of a deployed chain served at `<nitro_rpc_url>:<nitro_port>`.
    pub fn for_chain(
        info: &ChainInfo,
        nitro_rpc_url: &str,
        nitro_port: u16,
        block_explorer_url: Option<&str>,
    ) -> Self {
        Self {
            id: info.chain_id,
            name: info.chain_name.clone(),
            rpc_url: format!("{}:{}", nitro_rpc_url.trim_end_matches('/'), nitro_port),
            native_currency: NativeCurrency::default(),
            block_explorer_url: block_explorer_url
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }
}
