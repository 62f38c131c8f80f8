//! Deployed contract address records.

use alloy_core::primitives::Address;
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Addresses of the rollup contracts deployed on the parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreContracts {
    pub rollup: Address,
    pub native_token: Address,
    pub inbox: Address,
    pub outbox: Address,
    pub rollup_event_inbox: Address,
    pub challenge_manager: Address,
    pub admin_proxy: Address,
    pub sequencer_inbox: Address,
    pub bridge: Address,
    pub upgrade_executor: Address,
    /// Not deployed by BoLD-enabled rollup creators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_utils: Option<Address>,
    pub validator_wallet_creator: Address,
    pub deployed_at_block_number: u64,
}

/// Token bridge contract addresses on both chains.
///
/// Kept as an opaque record and written back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct TokenBridgeContracts(Value);
