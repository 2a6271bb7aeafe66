// Node wire messages

use serde::{Deserialize, Serialize};

/// Tip of the chain as reported by `get_mining_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastBlock {
    /// Empty before the first block is mined
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub id: u64,
}

/// Everything a round needs from the node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningInfo {
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub last_block: LastBlock,
    #[serde(default)]
    pub pending_transactions_hashes: Vec<String>,
}

impl MiningInfo {
    /// Number of the block this round tries to mine
    pub fn next_block_no(&self) -> u64 {
        self.last_block.id + 1
    }
}

/// Envelope of the `get_mining_info` response
#[derive(Debug, Clone, Deserialize)]
pub struct MiningInfoResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    pub result: MiningInfo,
}

fn default_ok() -> bool {
    true
}

/// Body of `push_block`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushBlockRequest {
    /// Hex of the full candidate bytes, nonce included
    pub block_content: String,
    pub txs: Vec<String>,
    pub block_no: u64,
}

/// Response of `push_block`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushBlockResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mining_info() {
        let body = r#"{
            "ok": true,
            "result": {
                "difficulty": 6.5,
                "last_block": { "hash": "00ff", "id": 41, "extra": 1 },
                "pending_transactions_hashes": ["aa", "bb"],
                "merkle_root": "ignored"
            }
        }"#;
        let response: MiningInfoResponse = serde_json::from_str(body).unwrap();
        assert!(response.ok);
        assert_eq!(response.result.difficulty, 6.5);
        assert_eq!(response.result.last_block.hash, "00ff");
        assert_eq!(response.result.next_block_no(), 42);
        assert_eq!(response.result.pending_transactions_hashes, vec!["aa", "bb"]);
    }

    #[test]
    fn test_decode_mining_info_before_first_block() {
        let body = r#"{"result": {"difficulty": 6.0, "last_block": {}, "pending_transactions_hashes": []}}"#;
        let response: MiningInfoResponse = serde_json::from_str(body).unwrap();
        assert!(response.ok);
        assert!(response.result.last_block.hash.is_empty());
        assert_eq!(response.result.next_block_no(), 1);
    }

    #[test]
    fn test_encode_push_block() {
        let request = PushBlockRequest {
            block_content: "beef".to_string(),
            txs: vec!["aa".to_string()],
            block_no: 7,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "block_content": "beef", "txs": ["aa"], "block_no": 7 })
        );
    }

    #[test]
    fn test_decode_push_block_rejection() {
        let response: PushBlockResponse =
            serde_json::from_str(r#"{"ok": false, "error": "stale block"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("stale block"));
    }
}
