//! Data availability server (Anytrust) configuration.

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};

/// Keyset registered in the sequencer inbox of a freshly deployed Anytrust chain.
///
/// One committee member with a placeholder BLS key, one honest member assumed.
pub const DEFAULT_KEYSET: &str = concat!(
    "0x",
    "0000000000000001",
    "0000000000000001",
    "0121",
    "60",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
);

/// Directory holding the DAS BLS keys inside the DAS container.
pub const DAS_KEY_DIR: &str = "/home/user/.arbitrum/keys";
/// Directory the DAS server stores batch data in.
pub const DAS_DATA_DIR: &str = "/home/user/das-data";
/// Address the DAS server binds its RPC and REST endpoints to.
pub const DAS_BIND_ADDR: &str = "0.0.0.0";
/// URL of the DAS server as seen from the nodes.
pub const DEFAULT_DAS_URL: &str = "http://localhost:9876";

/// A decoded data availability committee keyset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyset {
    pub assumed_honest: u64,
    pub pub_keys: Vec<Vec<u8>>,
}

impl Keyset {
    /// Decode a keyset: `u64` assumed honest, `u64` key count, then each key
    /// as a big-endian `u16` length followed by the key bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;

        let assumed_honest = u64::from_be_bytes(take(&mut reader, 8)?.try_into()?);
        let key_count = u64::from_be_bytes(take(&mut reader, 8)?.try_into()?);

        let mut pub_keys = Vec::new();
        for index in 0..key_count {
            let len = u16::from_be_bytes(
                take(&mut reader, 2)
                    .with_context(|| format!("Keyset truncated before key {index} length"))?
                    .try_into()?,
            );
            let key = take(&mut reader, len as usize)
                .with_context(|| format!("Keyset truncated inside key {index}"))?;
            pub_keys.push(key.to_vec());
        }

        if !reader.is_empty() {
            anyhow::bail!("Keyset has {} trailing bytes", reader.len());
        }

        Ok(Self {
            assumed_honest,
            pub_keys,
        })
    }

    /// Decode a `0x`-prefixed hex keyset.
    pub fn from_hex(keyset: &str) -> Result<Self> {
        let bytes = hex::decode(keyset.trim_start_matches("0x")).context("Keyset is not hex")?;
        Self::decode(&bytes)
    }

    /// The default single-member keyset.
    pub fn default_keyset() -> Result<Self> {
        Self::from_hex(DEFAULT_KEYSET)
    }

    /// Base64-encoded public keys, as expected by the node's RPC aggregator backends.
    pub fn encoded_pub_keys(&self) -> Vec<String> {
        self.pub_keys
            .iter()
            .map(|key| BASE64_STANDARD.encode(key))
            .collect()
    }
}

fn take<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if reader.len() < len {
        anyhow::bail!("Unexpected end of keyset: need {len} bytes, {} left", reader.len());
    }
    let (head, tail) = reader.split_at(len);
    *reader = tail;
    Ok(head)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DasKeyConfig {
    pub key_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DasLocalCacheConfig {
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DasLocalFileStorageConfig {
    pub enable: bool,
    pub data_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataAvailabilityConfig {
    pub parent_chain_node_url: String,
    pub sequencer_inbox_address: Address,
    pub key: DasKeyConfig,
    pub local_cache: DasLocalCacheConfig,
    pub local_file_storage: DasLocalFileStorageConfig,
}

/// Configuration file of the DAS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DasNodeConfig {
    pub data_availability: DataAvailabilityConfig,
    pub enable_rpc: bool,
    pub rpc_addr: String,
    pub enable_rest: bool,
    pub rest_addr: String,
    pub log_level: String,
}

/// Prepare the DAS server configuration for a chain.
pub fn prepare_das_config(parent_chain_rpc: &str, sequencer_inbox: Address) -> DasNodeConfig {
    DasNodeConfig {
        data_availability: DataAvailabilityConfig {
            parent_chain_node_url: parent_chain_rpc.to_string(),
            sequencer_inbox_address: sequencer_inbox,
            key: DasKeyConfig {
                key_dir: DAS_KEY_DIR.to_string(),
            },
            local_cache: DasLocalCacheConfig { enable: true },
            local_file_storage: DasLocalFileStorageConfig {
                enable: true,
                data_dir: DAS_DATA_DIR.to_string(),
            },
        },
        enable_rpc: true,
        rpc_addr: DAS_BIND_ADDR.to_string(),
        enable_rest: true,
        rest_addr: DAS_BIND_ADDR.to_string(),
        log_level: "INFO".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;
    use serde_json::json;

    #[test]
    fn test_default_keyset_layout() {
        assert_eq!(DEFAULT_KEYSET.len(), 2 + 614);

        let keyset = Keyset::default_keyset().unwrap();
        assert_eq!(keyset.assumed_honest, 1);
        assert_eq!(keyset.pub_keys.len(), 1);
        assert_eq!(keyset.pub_keys[0].len(), 289);
        assert_eq!(keyset.pub_keys[0][0], 0x60);
        assert!(keyset.pub_keys[0][1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_default_keyset_encoded_key() {
        let encoded = Keyset::default_keyset().unwrap().encoded_pub_keys();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0].len(), 388);
        assert!(encoded[0].starts_with("YAAAAAAA"));
        assert!(encoded[0].ends_with("AA=="));
    }

    #[test]
    fn test_keyset_rejects_truncated_input() {
        let bytes = hex::decode("0000000000000001000000000000000200020102").unwrap();
        let err = Keyset::decode(&bytes).unwrap_err();
        assert!(format!("{err:#}").contains("key 1"));

        assert!(Keyset::decode(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_keyset_rejects_trailing_bytes() {
        let bytes = hex::decode("0000000000000001000000000000000000ff").unwrap();
        assert!(Keyset::decode(&bytes).is_err());
    }

    #[test]
    fn test_das_config_layout() {
        let inbox = address!("0x1000000000000000000000000000000000000007");
        let value =
            serde_json::to_value(prepare_das_config("https://sepolia.example", inbox)).unwrap();

        assert_eq!(
            value["data-availability"]["parent-chain-node-url"],
            json!("https://sepolia.example")
        );
        assert_eq!(
            value["data-availability"]["key"]["key-dir"],
            json!("/home/user/.arbitrum/keys")
        );
        assert_eq!(value["data-availability"]["local-cache"]["enable"], json!(true));
        assert_eq!(
            value["data-availability"]["local-file-storage"]["data-dir"],
            json!("/home/user/das-data")
        );
        assert_eq!(value["enable-rpc"], json!(true));
        assert_eq!(value["rest-addr"], json!("0.0.0.0"));
        assert_eq!(value["log-level"], json!("INFO"));

        let address: Address =
            serde_json::from_value(value["data-availability"]["sequencer-inbox-address"].clone())
                .unwrap();
        assert_eq!(address, inbox);
    }
}
