//! Read-only JSON-RPC helpers for the parent chain.

use std::time::Duration;

use alloy_core::primitives::{Address, U256};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Timeout of a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {method} request to {url}"))?;

    let response: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {method} response"))?;

    parse_response(method, response)
}

fn parse_response<T: DeserializeOwned>(method: &str, response: Value) -> Result<T, anyhow::Error> {
    if let Some(error) = response.get("error") {
        anyhow::bail!(
            "RPC error on {}: {}",
            method,
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        );
    }

    let result = response
        .get("result")
        .with_context(|| format!("No result in {method} response"))?
        .clone();

    serde_json::from_value(result).with_context(|| format!("Failed to deserialize {method} result"))
}

fn parse_quantity(method: &str, quantity: &str) -> Result<U256, anyhow::Error> {
    let digits = quantity
        .strip_prefix("0x")
        .with_context(|| format!("{method} returned a non-hex quantity: {quantity}"))?;
    U256::from_str_radix(digits, 16)
        .with_context(|| format!("{method} returned an invalid quantity: {quantity}"))
}

/// Chain id reported by the endpoint.
pub async fn chain_id(client: &reqwest::Client, url: &str) -> Result<u64, anyhow::Error> {
    let quantity: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    let chain_id = parse_quantity("eth_chainId", &quantity)?;
    u64::try_from(chain_id)
        .ok()
        .with_context(|| format!("Chain id {chain_id} does not fit in u64"))
}

/// Latest balance of `address`, in wei.
pub async fn get_balance(
    client: &reqwest::Client,
    url: &str,
    address: Address,
) -> Result<U256, anyhow::Error> {
    let quantity: String = json_rpc_call(
        client,
        url,
        "eth_getBalance",
        vec![Value::String(address.to_string()), Value::from("latest")],
    )
    .await?;
    parse_quantity("eth_getBalance", &quantity)
}

/// Poll `check` every `interval` until it reports `true`.
///
/// Failed checks are logged and retried. Without a timeout this waits until
/// the condition holds.
pub async fn poll_until<F, Fut>(
    name: &str,
    interval: Duration,
    timeout: Option<Duration>,
    check: F,
) -> Result<(), anyhow::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<bool, anyhow::Error>>,
{
    let start = std::time::Instant::now();

    loop {
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => {
                tracing::debug!(condition = %name, "Condition not met yet, waiting...");
            }
            Err(e) => {
                tracing::warn!(error = %e, condition = %name, "Check failed, retrying...");
            }
        }

        if let Some(timeout) = timeout {
            if start.elapsed() + interval > timeout {
                anyhow::bail!("Timeout waiting for {}", name);
            }
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("m", "0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("m", "0x66eee").unwrap(), U256::from(421_614u64));
        assert!(parse_quantity("m", "1234").is_err());
        assert!(parse_quantity("m", "0xzz").is_err());
    }

    #[test]
    fn test_parse_response() {
        let result: String =
            parse_response("eth_chainId", json!({"jsonrpc": "2.0", "id": 1, "result": "0x1"}))
                .unwrap();
        assert_eq!(result, "0x1");

        let err = parse_response::<String>(
            "eth_getBalance",
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "header not found"}}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("header not found"));

        assert!(parse_response::<String>("eth_chainId", json!({"id": 1})).is_err());
    }

    #[tokio::test]
    async fn test_poll_until_retries_until_true() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        poll_until("counter", Duration::from_millis(1), None, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                anyhow::bail!("transient");
            }
            Ok(n >= 3)
        })
        .await
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let err = poll_until(
            "never",
            Duration::from_millis(5),
            Some(Duration::from_millis(20)),
            || async { Ok(false) },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("never"));
    }
}
