// Blocking HTTP client for the node API

use crate::network::{MiningInfo, MiningInfoResponse, NodeError, NodeService, PushBlockRequest, PushBlockResponse};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_NODE_URL: &str = "https://api.upow.ai/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Node API over HTTP
pub struct HttpNodeClient {
    base_url: String,
    client: Client,
}

impl HttpNodeClient {
    pub fn new(base_url: &str) -> Result<Self, NodeError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NodeError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base_url(base_url),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NodeError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NodeError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|e| NodeError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| NodeError::Decode(e.to_string()))
    }
}

impl NodeService for HttpNodeClient {
    fn get_mining_info(&self) -> Result<MiningInfo, NodeError> {
        let response = self
            .client
            .get(self.endpoint("get_mining_info"))
            .send()
            .map_err(|e| NodeError::Transport(e.to_string()))?;

        let info: MiningInfoResponse = Self::decode(response)?;
        if !info.ok {
            return Err(NodeError::Rejected("get_mining_info returned ok=false".to_string()));
        }
        Ok(info.result)
    }

    fn push_block(&self, block: &PushBlockRequest) -> Result<bool, NodeError> {
        let response = self
            .client
            .post(self.endpoint("push_block"))
            .json(block)
            .send()
            .map_err(|e| NodeError::Transport(e.to_string()))?;

        let reply: PushBlockResponse = Self::decode(response)?;
        if !reply.ok {
            if let Some(reason) = &reply.error {
                log::warn!("Node refused block {}: {}", block.block_no, reason);
            }
        }
        Ok(reply.ok)
    }
}

/// Endpoints are appended to the base URL, so it must end with a slash
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
