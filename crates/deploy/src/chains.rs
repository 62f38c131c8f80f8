//! Parent chains a new chain can settle to.

use alloy_core::primitives::{Address, address};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Token bridge creator used on custom parent chains when none is configured.
pub const DEFAULT_CUSTOM_TOKEN_BRIDGE_CREATOR: Address =
    address!("0x2000000000000000000000000000000000000000");

/// Native currency metadata of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Identity of a chain: how to address it and how to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIdentity {
    pub id: u64,
    pub name: String,
    pub rpc_url: String,
    pub native_currency: NativeCurrency,
    pub block_explorer_url: Option<String>,
}

impl ChainIdentity {
    /// Link to a transaction on the block explorer, or the bare hash if there is none.
    pub fn block_explorer_tx_url(&self, tx_hash: &str) -> String {
        match &self.block_explorer_url {
            Some(explorer) => format!("{}/tx/{}", explorer.trim_end_matches('/'), tx_hash),
            None => tx_hash.to_string(),
        }
    }
}

/// Parent chains supported out of the box.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum KnownParentChain {
    Mainnet,
    Sepolia,
    ArbitrumOne,
    ArbitrumNova,
    ArbitrumSepolia,
}

impl KnownParentChain {
    pub fn chain_id(&self) -> u64 {
        match self {
            KnownParentChain::Mainnet => 1,
            KnownParentChain::Sepolia => 11_155_111,
            KnownParentChain::ArbitrumOne => 42_161,
            KnownParentChain::ArbitrumNova => 42_170,
            KnownParentChain::ArbitrumSepolia => 421_614,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        <Self as strum::IntoEnumIterator>::iter().find(|chain| chain.chain_id() == chain_id)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            KnownParentChain::Mainnet => "Ethereum",
            KnownParentChain::Sepolia => "Sepolia",
            KnownParentChain::ArbitrumOne => "Arbitrum One",
            KnownParentChain::ArbitrumNova => "Arbitrum Nova",
            KnownParentChain::ArbitrumSepolia => "Arbitrum Sepolia",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            KnownParentChain::Mainnet => "https://eth.merkle.io",
            KnownParentChain::Sepolia => "https://sepolia.drpc.org",
            KnownParentChain::ArbitrumOne => "https://arb1.arbitrum.io/rpc",
            KnownParentChain::ArbitrumNova => "https://nova.arbitrum.io/rpc",
            KnownParentChain::ArbitrumSepolia => "https://sepolia-rollup.arbitrum.io/rpc",
        }
    }

    pub fn block_explorer_url(&self) -> &'static str {
        match self {
            KnownParentChain::Mainnet => "https://etherscan.io",
            KnownParentChain::Sepolia => "https://sepolia.etherscan.io",
            KnownParentChain::ArbitrumOne => "https://arbiscan.io",
            KnownParentChain::ArbitrumNova => "https://nova.arbiscan.io",
            KnownParentChain::ArbitrumSepolia => "https://sepolia.arbiscan.io",
        }
    }

    /// Ethereum L1 chains need a beacon RPC to read blobs.
    pub fn is_l1(&self) -> bool {
        matches!(self, KnownParentChain::Mainnet | KnownParentChain::Sepolia)
    }

    pub fn is_arbitrum(&self) -> bool {
        !self.is_l1()
    }
}

/// Factory contracts used to create chains and token bridges on a parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentContracts {
    pub rollup_creator: Address,
    pub token_bridge_creator: Address,
}

/// Factory contracts deployed on the known parent chains, if any.
pub fn deployment_contracts(chain_id: u64) -> Option<DeploymentContracts> {
    match chain_id {
        421_614 => Some(DeploymentContracts {
            rollup_creator: address!("0x06E341073b2749e0Bb9912461351f716DeCDa9b0"),
            token_bridge_creator: address!("0xC35800028e31044173d37291F425DCc42D068c84"),
        }),
        42_161 => Some(DeploymentContracts {
            rollup_creator: address!("0x9CAd81628aB7D8e239F1A5B497313341578c5F71"),
            token_bridge_creator: address!("0x8B9D9490a68B1F16ac8A21DdAE5Fd7aB9d708c14"),
        }),
        _ => None,
    }
}

/// Settings needed to use a parent chain that is not supported out of the box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomParentChainArgs {
    pub rpc_url: Option<String>,
    pub rollup_creator: Option<Address>,
    pub weth: Option<Address>,
    pub max_data_size: Option<u64>,
    pub token_bridge_creator: Option<Address>,
}

/// A registered custom parent chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomParentChain {
    pub contracts: DeploymentContracts,
    pub weth: Address,
    pub max_data_size: u64,
}

/// A resolved parent chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentChain {
    Known(KnownParentChain),
    Custom {
        identity: ChainIdentity,
        custom: CustomParentChain,
    },
}

impl ParentChain {
    /// Resolve a parent chain id.
    ///
    /// Known chains are returned as is. Any other chain id is registered as a
    /// custom parent chain, which requires its RPC URL, rollup creator, WETH
    /// address and maximum data size.
    pub fn resolve(chain_id: u64, custom: &CustomParentChainArgs) -> anyhow::Result<Self> {
        if let Some(known) = KnownParentChain::from_chain_id(chain_id) {
            return Ok(ParentChain::Known(known));
        }

        let (Some(rpc_url), Some(rollup_creator), Some(weth), Some(max_data_size)) = (
            custom.rpc_url.as_ref().filter(|url| !url.is_empty()),
            custom.rollup_creator,
            custom.weth,
            custom.max_data_size,
        ) else {
            anyhow::bail!(
                "Chain with id {chain_id} isn't supported out of the box. To register it, set the following env variables: PARENT_CHAIN_RPC_URL, ROLLUPCREATOR_FACTORY_ADDRESS, WETH_ADDRESS, CHAIN_MAX_DATA_SIZE."
            );
        };

        url::Url::parse(rpc_url)
            .with_context(|| format!("Invalid parent chain RPC URL: {rpc_url}"))?;

        let token_bridge_creator = custom
            .token_bridge_creator
            .unwrap_or(DEFAULT_CUSTOM_TOKEN_BRIDGE_CREATOR);

        tracing::info!(
            chain_id,
            rpc_url = %rpc_url,
            %rollup_creator,
            %token_bridge_creator,
            "Registering custom parent chain"
        );

        Ok(ParentChain::Custom {
            identity: ChainIdentity {
                id: chain_id,
                name: "Parent chain".to_string(),
                rpc_url: rpc_url.clone(),
                native_currency: NativeCurrency::default(),
                block_explorer_url: None,
            },
            custom: CustomParentChain {
                contracts: DeploymentContracts {
                    rollup_creator,
                    token_bridge_creator,
                },
                weth,
                max_data_size,
            },
        })
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            ParentChain::Known(known) => known.chain_id(),
            ParentChain::Custom { identity, .. } => identity.id,
        }
    }

    pub fn identity(&self) -> ChainIdentity {
        match self {
            ParentChain::Known(known) => ChainIdentity {
                id: known.chain_id(),
                name: known.display_name().to_string(),
                rpc_url: known.default_rpc_url().to_string(),
                native_currency: NativeCurrency::default(),
                block_explorer_url: Some(known.block_explorer_url().to_string()),
            },
            ParentChain::Custom { identity, .. } => identity.clone(),
        }
    }

    /// Whether the chain is supported without custom registration.
    pub fn is_supported(&self) -> bool {
        matches!(self, ParentChain::Known(_))
    }

    pub fn is_l1(&self) -> bool {
        match self {
            ParentChain::Known(known) => known.is_l1(),
            ParentChain::Custom { .. } => false,
        }
    }

    /// Whether the parent chain is itself an Arbitrum chain.
    ///
    /// Custom parent chains are assumed not to be.
    pub fn is_arbitrum(&self) -> bool {
        match self {
            ParentChain::Known(known) => known.is_arbitrum(),
            ParentChain::Custom { .. } => false,
        }
    }

    pub fn deployment_contracts(&self) -> Option<DeploymentContracts> {
        match self {
            ParentChain::Known(known) => deployment_contracts(known.chain_id()),
            ParentChain::Custom { custom, .. } => Some(custom.contracts),
        }
    }

    /// RPC URL to use: the override if one is set, the chain default otherwise.
    pub fn rpc_url(&self, rpc_override: Option<&str>) -> String {
        rpc_override
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.identity().rpc_url)
    }
}
