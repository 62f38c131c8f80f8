//! Default node configuration for a freshly deployed chain.
//!
//! [`NodeConfigPreparer`] is the seam towards whatever produces the default
//! configuration. [`StandardNodeConfig`] produces the standard Nitro layout:
//! a single node acting as sequencer, batch poster and staker, which is then
//! split per role by [`super::split_config_per_type`].

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    chain_config::ChainConfig,
    contracts::CoreContracts,
    das::{DEFAULT_DAS_URL, Keyset},
    keys::{sanitize_private_key, signer_from_key},
};

/// Default HTTP port of the node.
pub const DEFAULT_HTTP_PORT: u16 = 8449;

/// Inputs needed to produce a node configuration.
#[derive(Debug, Clone)]
pub struct PrepareNodeConfigParams {
    pub chain_name: String,
    pub chain_config: ChainConfig,
    pub core_contracts: CoreContracts,
    pub batch_poster_private_key: String,
    pub validator_private_key: String,
    pub stake_token: Address,
    pub parent_chain_id: u64,
    pub parent_chain_rpc_url: String,
    /// Only needed when the parent chain is an Ethereum L1.
    pub parent_chain_beacon_rpc_url: Option<String>,
    /// Required for parent chains that are not supported out of the box.
    pub parent_chain_is_arbitrum: Option<bool>,
}

/// Produces the default node configuration for a chain.
pub trait NodeConfigPreparer {
    fn prepare_node_config(&self, params: &PrepareNodeConfigParams) -> Result<Value>;
}

/// Entry of the node's `chain.info-json` array.
#[derive(Debug, Serialize)]
struct ChainInfoEntry<'a> {
    #[serde(rename = "chain-id")]
    chain_id: u64,
    #[serde(rename = "parent-chain-id")]
    parent_chain_id: u64,
    #[serde(rename = "parent-chain-is-arbitrum", skip_serializing_if = "Option::is_none")]
    parent_chain_is_arbitrum: Option<bool>,
    #[serde(rename = "chain-name")]
    chain_name: &'a str,
    #[serde(rename = "chain-config")]
    chain_config: &'a ChainConfig,
    rollup: RollupEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct RollupEntry {
    bridge: Address,
    inbox: Address,
    sequencer_inbox: Address,
    rollup: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    validator_utils: Option<Address>,
    validator_wallet_creator: Address,
    stake_token: Address,
    deployed_at: u64,
}

#[derive(Debug, Serialize)]
struct DasBackend {
    url: String,
    pubkey: String,
    signermask: u64,
}

/// The standard Nitro node configuration.
#[derive(Debug, Clone, Default)]
pub struct StandardNodeConfig;

impl StandardNodeConfig {
    fn info_json(params: &PrepareNodeConfigParams) -> Result<String> {
        let contracts = &params.core_contracts;
        let entry = ChainInfoEntry {
            chain_id: params.chain_config.chain_id,
            parent_chain_id: params.parent_chain_id,
            parent_chain_is_arbitrum: params.parent_chain_is_arbitrum,
            chain_name: &params.chain_name,
            chain_config: &params.chain_config,
            rollup: RollupEntry {
                bridge: contracts.bridge,
                inbox: contracts.inbox,
                sequencer_inbox: contracts.sequencer_inbox,
                rollup: contracts.rollup,
                validator_utils: contracts.validator_utils,
                validator_wallet_creator: contracts.validator_wallet_creator,
                stake_token: params.stake_token,
                deployed_at: contracts.deployed_at_block_number,
            },
        };

        serde_json::to_string(&[entry]).context("Failed to serialize chain info")
    }

    fn data_availability(params: &PrepareNodeConfigParams) -> Result<Value> {
        let keyset = Keyset::default_keyset().context("Failed to decode default keyset")?;
        let backends: Vec<DasBackend> = keyset
            .encoded_pub_keys()
            .into_iter()
            .enumerate()
            .map(|(index, pubkey)| DasBackend {
                url: DEFAULT_DAS_URL.to_string(),
                pubkey,
                signermask: 1 << index,
            })
            .collect();

        Ok(json!({
            "enable": true,
            "sequencer-inbox-address": params.core_contracts.sequencer_inbox,
            "parent-chain-node-url": params.parent_chain_rpc_url,
            "rest-aggregator": {
                "enable": true,
                "urls": [DEFAULT_DAS_URL]
            },
            "rpc-aggregator": {
                "enable": true,
                "assumed-honest": keyset.assumed_honest,
                "backends": serde_json::to_string(&backends)
                    .context("Failed to serialize DAS backends")?
            }
        }))
    }
}

impl NodeConfigPreparer for StandardNodeConfig {
    fn prepare_node_config(&self, params: &PrepareNodeConfigParams) -> Result<Value> {
        signer_from_key(&params.batch_poster_private_key)
            .context("Invalid batch poster private key")?;
        signer_from_key(&params.validator_private_key).context("Invalid validator private key")?;

        let mut config = json!({
            "chain": {
                "info-json": Self::info_json(params)?,
                "name": params.chain_name
            },
            "parent-chain": {
                "connection": {
                    "url": params.parent_chain_rpc_url
                }
            },
            "http": {
                "addr": "0.0.0.0",
                "port": DEFAULT_HTTP_PORT,
                "vhosts": "*",
                "corsdomain": "*",
                "api": ["eth", "net", "web3", "arb", "debug"]
            },
            "node": {
                "sequencer": true,
                "delayed-sequencer": {
                    "enable": true,
                    "use-merge-finality": false,
                    "finalize-distance": 1
                },
                "batch-poster": {
                    "max-size": 90000,
                    "enable": true,
                    "parent-chain-wallet": {
                        "private-key": sanitize_private_key(&params.batch_poster_private_key)
                    }
                },
                "staker": {
                    "enable": true,
                    "strategy": "MakeNodes",
                    "parent-chain-wallet": {
                        "private-key": sanitize_private_key(&params.validator_private_key)
                    }
                },
                "dangerous": {
                    "no-sequencer-coordinator": true
                }
            },
            "execution": {
                "forwarding-target": "",
                "sequencer": {
                    "enable": true,
                    "max-tx-data-size": 85000,
                    "max-block-speed": "250ms"
                },
                "caching": {
                    "archive": true
                }
            }
        });

        if let Some(beacon_url) = params
            .parent_chain_beacon_rpc_url
            .as_deref()
            .filter(|url| !url.is_empty())
        {
            config["parent-chain"]["blob-client"] = json!({ "beacon-url": beacon_url });
        }

        if params.chain_config.is_anytrust() {
            config["node"]["data-availability"] = Self::data_availability(params)?;
        }

        tracing::debug!(
            chain_id = params.chain_config.chain_id,
            parent_chain_id = params.parent_chain_id,
            anytrust = params.chain_config.is_anytrust(),
            "Prepared default node configuration"
        );

        Ok(config)
    }
}
