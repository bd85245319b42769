//! Shared mocks for the contract tests.
//!
//! Each test binary uses a subset of these.
#![allow(dead_code)]

use ragpipe_core::{
    Completion, CompletionBackend, CompletionRequest, ContentBlock, Error, Result, SearchResult,
    SearchProvider, TextExtractor,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Completion backend that replays a fixed script of responses, one per
/// call, and counts how many calls it served.
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<Completion>>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<Result<Completion>>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn text(s: &str) -> Result<Completion> {
        Ok(Completion {
            content: vec![ContentBlock::Text {
                text: s.to_string(),
            }],
            stop_reason: Some("end_turn".to_string()),
        })
    }

    pub fn tool_use(id: &str, name: &str, method: &str, params: serde_json::Value) -> Result<Completion> {
        Ok(Completion {
            content: vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: serde_json::json!({"method": method, "params": params}),
            }],
            stop_reason: Some("tool_use".to_string()),
        })
    }

    pub fn failure() -> Result<Completion> {
        Err(Error::Llm("scripted failure".to_string()))
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(&self, _req: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm("script exhausted".to_string())))
    }
}

/// Search provider returning a fixed outcome.
pub struct MockSearch {
    outcome: Result<Vec<SearchResult>>,
}

impl MockSearch {
    pub fn results(results: Vec<SearchResult>) -> Self {
        Self {
            outcome: Ok(results),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(Error::Search("connection refused".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        match &self.outcome {
            Ok(results) => Ok(results.iter().take(max_results).cloned().collect()),
            Err(Error::Search(msg)) => Err(Error::Search(msg.clone())),
            Err(_) => unreachable!(),
        }
    }
}

/// Extractor answering every url with the same text.
pub struct MockExtractor(pub String);

#[async_trait::async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, _url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

pub fn result(title: &str, url: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        snippet: format!("{title} snippet"),
    }
}
