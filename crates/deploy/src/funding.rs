//! Parent chain funding checks for the operator accounts.

use std::time::Duration;

use alloy_core::primitives::{
    Address, U256,
    utils::{format_ether, parse_ether},
};
use anyhow::{Context, Result};

use crate::{keys::OperatorAccount, rpc};

/// Amount of ether each operator account should hold when none is configured.
pub const DEFAULT_FUNDING_AMOUNT: &str = "0.3";

/// Delay between balance checks while waiting for funding.
pub const DEFAULT_FUNDING_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Balance of one operator account compared to its funding target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingCheck {
    pub role: &'static str,
    pub address: Address,
    pub balance: U256,
    pub target: U256,
}

impl FundingCheck {
    pub fn is_funded(&self) -> bool {
        self.balance >= self.target
    }

    /// Amount still missing to reach the target.
    pub fn shortfall(&self) -> U256 {
        self.target.saturating_sub(self.balance)
    }

    pub fn balance_ether(&self) -> String {
        format_ether(self.balance)
    }

    pub fn shortfall_ether(&self) -> String {
        format_ether(self.shortfall())
    }
}

/// Parse an amount of ether, falling back to [`DEFAULT_FUNDING_AMOUNT`] when empty.
pub fn parse_funding_amount(amount: Option<&str>) -> Result<U256> {
    let amount = amount
        .map(str::trim)
        .filter(|amount| !amount.is_empty())
        .unwrap_or(DEFAULT_FUNDING_AMOUNT);

    parse_ether(amount).with_context(|| format!("Invalid funding amount: {amount}"))
}

/// Fetch the balances of `accounts` and compare them to `target`.
pub async fn check_funding(
    client: &reqwest::Client,
    url: &str,
    accounts: &[&OperatorAccount],
    target: U256,
) -> Result<Vec<FundingCheck>> {
    let mut checks = Vec::with_capacity(accounts.len());

    for account in accounts {
        let balance = rpc::get_balance(client, url, account.address)
            .await
            .with_context(|| format!("Failed to fetch {} balance", account.role))?;

        let check = FundingCheck {
            role: account.role,
            address: account.address,
            balance,
            target,
        };
        tracing::debug!(
            role = check.role,
            address = %check.address,
            balance = %check.balance_ether(),
            funded = check.is_funded(),
            "Checked account balance"
        );
        checks.push(check);
    }

    Ok(checks)
}

/// Accounts of `checks` that still need funds.
pub fn unfunded(checks: &[FundingCheck]) -> Vec<&FundingCheck> {
    checks.iter().filter(|check| !check.is_funded()).collect()
}

/// Block until every account holds at least `target`, checking every `interval`.
pub async fn wait_for_funding(
    client: &reqwest::Client,
    url: &str,
    accounts: &[&OperatorAccount],
    target: U256,
    interval: Duration,
) -> Result<Vec<FundingCheck>> {
    rpc::poll_until("operator accounts to be funded", interval, None, move || async move {
        let checks = check_funding(client, url, accounts, target).await?;
        for check in unfunded(&checks) {
            tracing::info!(
                role = check.role,
                address = %check.address,
                missing = %check.shortfall_ether(),
                "Waiting for account to be funded"
            );
        }
        Ok(unfunded(&checks).is_empty())
    })
    .await?;

    check_funding(client, url, accounts, target).await
}
