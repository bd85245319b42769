use crate::env;
use ragpipe_core::{
    Completion, CompletionBackend, CompletionRequest, ContentBlock, Error, Message, Result,
    ToolSpec,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

fn api_key_from_env() -> Option<String> {
    env("RAGPIPE_ANTHROPIC_API_KEY").or_else(|| env("ANTHROPIC_API_KEY"))
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Credentials are required; a missing key is fatal at startup.
    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| {
            Error::NotConfigured(
                "missing RAGPIPE_ANTHROPIC_API_KEY (or ANTHROPIC_API_KEY)".to_string(),
            )
        })?;
        // Endpoint override for testing/debugging (do not include secrets here).
        let endpoint =
            env("RAGPIPE_ANTHROPIC_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let model = env("RAGPIPE_ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self::new(client, api_key, endpoint, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl CompletionBackend for AnthropicClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: req.max_tokens,
            system: &req.system,
            messages: &req.messages,
            temperature: req.temperature,
            tools: req.tools.iter().map(WireTool::from_spec).collect(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!("anthropic messages HTTP {status}")));
        }

        let parsed: MessagesResponse = resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        Ok(Completion {
            content: parsed.content,
            stop_reason: parsed.stop_reason,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u64,
    system: &'a str,
    // Core Message/ContentBlock serde shapes match the wire directly.
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

impl WireTool {
    fn from_spec(spec: &ToolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            // Permissive schema: the loop's call records carry {method, params}.
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "method": { "type": "string" },
                    "params": { "type": "object" }
                }
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testenv::{EnvGuard, ENV_LOCK};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;

    #[test]
    fn empty_api_key_is_treated_as_missing() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _g1 = EnvGuard::set("RAGPIPE_ANTHROPIC_API_KEY", "   ");
        let _g2 = EnvGuard::unset("ANTHROPIC_API_KEY");
        assert!(api_key_from_env().is_none());
    }

    #[test]
    fn request_serializes_manifest_and_skips_empty_tools() {
        let with_tools = MessagesRequest {
            model: "m",
            max_tokens: 100,
            system: "s",
            messages: &[Message::user("hi")],
            temperature: Some(0.0),
            tools: vec![WireTool::from_spec(&ToolSpec {
                name: "file_system".to_string(),
                description: "Access files on the local system".to_string(),
            })],
        };
        let v = serde_json::to_value(&with_tools).unwrap();
        assert_eq!(v["tools"][0]["name"], "file_system");
        assert_eq!(v["tools"][0]["input_schema"]["type"], "object");
        assert_eq!(v["messages"][0]["content"][0]["type"], "text");

        let without_tools = MessagesRequest {
            model: "m",
            max_tokens: 100,
            system: "s",
            messages: &[Message::user("hi")],
            temperature: None,
            tools: Vec::new(),
        };
        let v = serde_json::to_value(&without_tools).unwrap();
        assert!(v.get("tools").is_none());
        assert!(v.get("temperature").is_none());
    }

    #[test]
    fn parses_text_and_tool_use_response_blocks() {
        let js = r#"
        {
          "id": "msg_1",
          "content": [
            {"type": "text", "text": "Let me check."},
            {"type": "tool_use", "id": "tu_1", "name": "database",
             "input": {"method": "query", "params": {"sql": "select 1"}}}
          ],
          "stop_reason": "tool_use"
        }
        "#;
        let parsed: MessagesResponse = serde_json::from_str(js).unwrap();
        let completion = Completion {
            content: parsed.content,
            stop_reason: parsed.stop_reason,
        };
        assert_eq!(completion.text(), "Let me check.");
        let calls = completion.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "database");
        assert_eq!(calls[0].method, "query");
        assert_eq!(completion.stop_reason.as_deref(), Some("tool_use"));
    }

    #[tokio::test]
    async fn complete_round_trips_against_a_fixture_server() {
        let app = Router::new().route(
            "/v1/messages",
            post(|Json(body): Json<serde_json::Value>| async move {
                // Echo enough of the request back to verify the wire shape.
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["messages"][0]["role"], "user");
                Json(serde_json::json!({
                    "content": [{"type": "text", "text": "pong"}],
                    "stop_reason": "end_turn"
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = AnthropicClient::new(
            reqwest::Client::new(),
            "test-key",
            format!("http://{addr}/v1/messages"),
            "test-model",
        );
        let req = CompletionRequest::single_turn("sys", "ping", 100, 0.0);
        let completion = client.complete(&req).await.unwrap();
        assert_eq!(completion.text(), "pong");
        assert_eq!(completion.stop_reason.as_deref(), Some("end_turn"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_llm_error() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = AnthropicClient::new(
            reqwest::Client::new(),
            "test-key",
            format!("http://{addr}/v1/messages"),
            "test-model",
        );
        let req = CompletionRequest::single_turn("sys", "ping", 100, 0.0);
        let err = client.complete(&req).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)), "got {err:?}");
    }
}
