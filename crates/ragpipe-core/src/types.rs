use serde::{Deserialize, Serialize};

/// One candidate returned by the web search provider.
///
/// Order is provider-defined; relevance is not guaranteed until ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// A search result with a model-assigned relevance score (0-10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub result: SearchResult,
    pub relevance_score: f64,
    pub explanation: String,
}

/// Self-evaluation scores for a draft answer, each 0-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub accuracy: f64,
    pub completeness: f64,
    pub clarity: f64,
    pub conciseness: f64,
    pub evidence: f64,
}

impl AnswerEvaluation {
    /// The score set used when evaluation itself fails.
    pub fn neutral() -> Self {
        Self {
            accuracy: 5.0,
            completeness: 5.0,
            clarity: 5.0,
            conciseness: 5.0,
            evidence: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub question: String,
    pub rationale: String,
    /// 1-5, where 5 is highest priority.
    pub priority: i64,
}

/// The classifier's verdict on whether retrieval is required at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDecision {
    pub search_needed: bool,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Everything the orchestrator produced for one query.
///
/// Created once per query and never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub original_query: String,
    pub search_performed: bool,
    pub search_decision_reasoning: String,
    pub initial_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<AnswerEvaluation>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_answer: Option<String>,
    /// Equal to `refined_answer` when the critique ran, else the direct answer.
    pub answer: String,
    pub follow_up_questions: Vec<FollowUpQuestion>,
    /// The assembled context blob; present only when a search was performed
    /// and produced results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
///
/// The serde representation deliberately matches the Anthropic Messages
/// wire shape (`{"type": "text" | "tool_use" | "tool_result", ...}`) so
/// conversations serialize directly onto the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A tool-result turn: one block per `(tool_use_id, output)` pair.
    ///
    /// Tool results go back as a user turn, per the Messages protocol.
    pub fn tool_results(outputs: Vec<(String, String)>) -> Self {
        Self {
            role: Role::User,
            content: outputs
                .into_iter()
                .map(|(tool_use_id, content)| ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                })
                .collect(),
        }
    }
}

/// One assistant turn from the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl Completion {
    /// All text blocks concatenated, in order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    /// The tool invocations this turn requested, if any.
    ///
    /// Each `tool_use` input is expected to carry `{method, params}`;
    /// missing fields degrade to an empty method / empty params object.
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        let mut out = Vec::new();
        for block in &self.content {
            if let ContentBlock::ToolUse { id, name, input } = block {
                let method = input
                    .get("method")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let params = input
                    .get("params")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({}));
                out.push(ToolCallRecord {
                    id: id.clone(),
                    name: name.clone(),
                    method,
                    params,
                });
            }
        }
        out
    }
}

/// A manifest entry advertised to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// A registered tool: manifest entry plus the HTTP endpoint that serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub endpoint: String,
}

impl ToolDescriptor {
    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// One requested tool invocation, scoped to a single loop iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub method: String,
    pub params: serde_json::Value,
}
