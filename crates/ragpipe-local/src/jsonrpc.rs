//! JSON-RPC-shaped dispatch to registered tool endpoints.
//!
//! The envelope follows `{jsonrpc, id, method, params}` without full
//! JSON-RPC transport compliance; the response body is passed back to
//! the model verbatim.

use ragpipe_core::{Error, Result, ToolCallRecord, ToolDescriptor, ToolDispatcher};
use serde::Serialize;
use std::time::Duration;

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ToolEndpointClient {
    client: reqwest::Client,
}

impl ToolEndpointClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let resp = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .timeout(DISPATCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Tool(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Tool(format!("tool endpoint HTTP {status}")));
        }

        resp.json().await.map_err(|e| Error::Tool(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ToolDispatcher for ToolEndpointClient {
    async fn dispatch(
        &self,
        tool: &ToolDescriptor,
        call: &ToolCallRecord,
    ) -> Result<serde_json::Value> {
        self.call(&tool.endpoint, &call.method, &call.params).await
    }
}
