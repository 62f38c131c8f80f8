//! Structural overrides applied on top of the default node configuration.

use serde_json::{Value, json};

/// Posting cadence used when fast parent chain posting is requested.
pub const FAST_POSTING_INTERVAL: &str = "1m";

/// Disable parent chain finality gating everywhere the node waits for it.
pub fn disable_l1_finality() -> Value {
    json!({
        "node": {
            "parent-chain-reader": {
                "use-finality-data": false
            },
            "delayed-sequencer": {
                "require-full-finality": false
            },
            "batch-poster": {
                "data-poster": {
                    "wait-for-l1-finality": false
                }
            },
            "staker": {
                "data-poster": {
                    "wait-for-l1-finality": false
                }
            },
            "bold": {
                "rpc-block-number": "latest",
                "state-provider-config": {
                    "check-batch-finality": false
                }
            }
        },
        "execution": {
            "parent-chain-reader": {
                "use-finality-data": false
            }
        }
    })
}

/// Shrink batch posting and assertion cadence to [`FAST_POSTING_INTERVAL`].
pub fn fast_l1_posting() -> Value {
    json!({
        "node": {
            "batch-poster": {
                "max-delay": FAST_POSTING_INTERVAL
            },
            "staker": {
                "make-assertion-interval": FAST_POSTING_INTERVAL
            },
            "bold": {
                "assertion-posting-interval": FAST_POSTING_INTERVAL
            }
        }
    })
}

/// Initialize the chain from a genesis file instead of an empty state.
pub fn genesis_file(runtime_path: &str) -> Value {
    json!({
        "init": {
            "genesis-json-file": runtime_path,
            "empty": false
        }
    })
}

/// Set the HTTP listen port.
pub fn http_port(port: u16) -> Value {
    json!({ "http": { "port": port } })
}
