//! Status snapshots built from daemon RPC answers.
//!
//! Every numeric field defaults to zero when the daemon leaves it out.

use serde::Serialize;
use serde_json::Value;

fn u64_field(value: &Value, field: &str) -> u64 {
    value.get(field).and_then(Value::as_u64).unwrap_or(0)
}

/// `get-node-status` answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub running: bool,
    pub height: u64,
    pub peers: u64,
    pub difficulty: u64,
    pub hashrate: u64,
    pub tx_pool_size: u64,
}

impl NodeStatus {
    /// Node not running, not ready, or not answering.
    pub fn quiescent() -> Self {
        Self::default()
    }

    /// Map a fuegod `getinfo` result.
    pub fn from_getinfo(info: &Value) -> Self {
        Self {
            running: true,
            height: u64_field(info, "height"),
            peers: u64_field(info, "incoming_connections_count")
                .saturating_add(u64_field(info, "outgoing_connections_count")),
            difficulty: u64_field(info, "difficulty"),
            hashrate: u64_field(info, "hashrate"),
            tx_pool_size: u64_field(info, "tx_pool_size"),
        }
    }
}

/// `get-wallet-status` answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    pub running: bool,
    pub block_count: u64,
    pub known_block_count: u64,
    pub peer_count: u64,
}

impl WalletStatus {
    pub fn quiescent() -> Self {
        Self::default()
    }

    /// Map a walletd `getStatus` result.
    pub fn from_get_status(status: &Value) -> Self {
        Self {
            running: true,
            block_count: u64_field(status, "blockCount"),
            known_block_count: u64_field(status, "knownBlockCount"),
            peer_count: u64_field(status, "peerCount"),
        }
    }
}

/// First entry of a walletd `getAddresses` result, if non-empty.
pub fn first_address(result: &Value) -> Option<String> {
    result
        .get("addresses")
        .and_then(Value::as_array)
        .and_then(|addresses| addresses.first())
        .and_then(Value::as_str)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_address() {
        assert_eq!(
            first_address(&json!({"addresses": ["fire1a", "fire1b"]})),
            Some("fire1a".to_string())
        );
        assert_eq!(first_address(&json!({"addresses": []})), None);
        assert_eq!(first_address(&json!({"addresses": [""]})), None);
        assert_eq!(first_address(&json!({})), None);
    }

    #[test]
    fn test_node_status_from_getinfo() {
        let status = NodeStatus::from_getinfo(&json!({
            "height": 912345,
            "incoming_connections_count": 3,
            "outgoing_connections_count": 8,
            "difficulty": 1200,
            "hashrate": 40,
            "tx_pool_size": 2,
            "status": "OK"
        }));
        assert!(status.running);
        assert_eq!(status.height, 912345);
        assert_eq!(status.peers, 11);
        assert_eq!(status.difficulty, 1200);
        assert_eq!(status.tx_pool_size, 2);
    }

    #[test]
    fn test_node_status_missing_fields_are_zero() {
        let status = NodeStatus::from_getinfo(&json!({"height": 10}));
        assert!(status.running);
        assert_eq!(status.peers, 0);
        assert_eq!(status.hashrate, 0);
    }

    #[test]
    fn test_peer_count_saturates() {
        let status = NodeStatus::from_getinfo(&json!({
            "incoming_connections_count": u64::MAX,
            "outgoing_connections_count": 1
        }));
        assert_eq!(status.peers, u64::MAX);
    }

    #[test]
    fn test_quiescent_serialization() {
        let value = serde_json::to_value(NodeStatus::quiescent()).unwrap();
        assert_eq!(value["running"], json!(false));
        assert_eq!(value["height"], json!(0));
        assert_eq!(value["peers"], json!(0));
        assert_eq!(value["txPoolSize"], json!(0));
    }

    #[test]
    fn test_wallet_status_from_get_status() {
        let status = WalletStatus::from_get_status(&json!({
            "blockCount": 100,
            "knownBlockCount": 120,
            "peerCount": 4
        }));
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(
            value,
            json!({"running": true, "blockCount": 100, "knownBlockCount": 120, "peerCount": 4})
        );
    }
}
