//! Operator private keys and the accounts derived from them.

use std::str::FromStr;

use alloy_core::primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Add the `0x` prefix to a hex private key if it is missing.
pub fn sanitize_private_key(private_key: &str) -> String {
    let private_key = private_key.trim();
    if private_key.starts_with("0x") {
        private_key.to_string()
    } else {
        format!("0x{private_key}")
    }
}

/// Generate a new random private key, `0x`-prefixed.
pub fn generate_private_key() -> String {
    let signer = PrivateKeySigner::random();
    format!("0x{}", hex::encode(signer.to_bytes()))
}

/// Use the provided private key, or generate a new one if none was provided.
///
/// An empty string counts as not provided.
pub fn with_fallback_private_key(private_key: Option<&str>) -> String {
    match private_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => sanitize_private_key(key),
        None => {
            let key = generate_private_key();
            tracing::warn!("No private key provided, generated a new one");
            key
        }
    }
}

/// Parse a hex private key into a signer.
pub fn signer_from_key(private_key: &str) -> Result<PrivateKeySigner> {
    let sanitized = sanitize_private_key(private_key);
    let raw = &sanitized[2..];

    if raw.len() != 64 || hex::decode(raw).is_err() {
        anyhow::bail!("Invalid private key: expected 32 bytes of hex");
    }

    PrivateKeySigner::from_str(raw).context("Failed to load private key")
}

/// Address controlled by a hex private key.
pub fn address_of(private_key: &str) -> Result<Address> {
    Ok(signer_from_key(private_key)?.address())
}

/// A named operator account.
#[derive(Debug, Clone)]
pub struct OperatorAccount {
    pub role: &'static str,
    pub private_key: String,
    pub address: Address,
}

impl OperatorAccount {
    pub fn from_key(role: &'static str, private_key: &str) -> Result<Self> {
        let private_key = sanitize_private_key(private_key);
        let address =
            address_of(&private_key).with_context(|| format!("Invalid {role} private key"))?;

        Ok(Self {
            role,
            private_key,
            address,
        })
    }
}

/// The operator accounts involved in running a chain.
#[derive(Debug, Clone)]
pub struct OperatorAccounts {
    /// Only needed by flows that act on behalf of the chain owner.
    pub chain_owner: Option<OperatorAccount>,
    pub batch_poster: OperatorAccount,
    pub staker: OperatorAccount,
}

impl OperatorAccounts {
    /// Load the operator accounts, generating batch poster and staker keys when missing.
    pub fn load(
        chain_owner_key: Option<&str>,
        batch_poster_key: Option<&str>,
        staker_key: Option<&str>,
    ) -> Result<Self> {
        let chain_owner = chain_owner_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| OperatorAccount::from_key("chain owner", key))
            .transpose()?;

        let batch_poster = OperatorAccount::from_key(
            "batch poster",
            &with_fallback_private_key(batch_poster_key),
        )?;
        let staker = OperatorAccount::from_key("staker", &with_fallback_private_key(staker_key))?;

        Ok(Self {
            chain_owner,
            batch_poster,
            staker,
        })
    }

    /// All loaded accounts, chain owner first.
    pub fn all(&self) -> Vec<&OperatorAccount> {
        let mut accounts = Vec::with_capacity(3);
        if let Some(owner) = &self.chain_owner {
            accounts.push(owner);
        }
        accounts.push(&self.batch_poster);
        accounts.push(&self.staker);
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    // Well-known development key (account 0 of the default test mnemonic).
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_sanitize_private_key() {
        assert_eq!(sanitize_private_key("abcd"), "0xabcd");
        assert_eq!(sanitize_private_key("0xabcd"), "0xabcd");
        assert_eq!(sanitize_private_key(" abcd\n"), "0xabcd");
    }

    #[test]
    fn test_address_of_known_key() {
        let expected = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(address_of(DEV_KEY).unwrap(), expected);
        assert_eq!(address_of(&format!("0x{DEV_KEY}")).unwrap(), expected);
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        assert!(address_of("0x1234").is_err());
        assert!(address_of(&"zz".repeat(32)).is_err());
        assert!(address_of("").is_err());
    }

    #[test]
    fn test_fallback_generates_valid_key() {
        let generated = with_fallback_private_key(None);
        assert!(generated.starts_with("0x"));
        assert_eq!(generated.len(), 66);
        assert!(address_of(&generated).is_ok());

        let empty = with_fallback_private_key(Some(""));
        assert_ne!(empty, "0x");
        assert!(address_of(&empty).is_ok());

        assert_eq!(
            with_fallback_private_key(Some(DEV_KEY)),
            format!("0x{DEV_KEY}")
        );
    }

    #[test]
    fn test_operator_accounts_generate_missing_keys() {
        let accounts = OperatorAccounts::load(None, Some(DEV_KEY), None).unwrap();
        assert!(accounts.chain_owner.is_none());
        assert_eq!(
            accounts.batch_poster.address,
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_ne!(accounts.staker.address, accounts.batch_poster.address);
        assert_eq!(accounts.all().len(), 2);
    }

    #[test]
    fn test_operator_accounts_report_bad_owner_key() {
        let err = OperatorAccounts::load(Some("0xdead"), None, None).unwrap_err();
        assert!(format!("{err:#}").contains("chain owner"));
    }
}
