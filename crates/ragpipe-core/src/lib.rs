//! Backend-agnostic types and traits for the ragpipe answer pipeline.
//!
//! This crate intentionally contains no IO. The three external
//! collaborators (completion service, search provider, text extractor)
//! are trait seams; `ragpipe-local` carries the reqwest-backed
//! implementations.

pub mod structured;
pub mod types;

pub use types::*;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("extraction failed: {0}")]
    Extract(String),
    #[error("llm failed: {0}")]
    Llm(String),
    #[error("tool call failed: {0}")]
    Tool(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One request to the completion service.
///
/// Pipeline stages always send a single user turn; the tool loop grows
/// `messages` across iterations and advertises a tool manifest.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub max_tokens: u64,
    pub temperature: Option<f64>,
    pub tools: Vec<ToolSpec>,
}

impl CompletionRequest {
    /// A single-user-turn request with no tool manifest (the stage shape).
    pub fn single_turn(
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u64,
        temperature: f64,
    ) -> Self {
        Self {
            system: system.into(),
            messages: vec![Message::user(user)],
            max_tokens,
            temperature: Some(temperature),
            tools: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion>;
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Returns at most `max_results` results. Zero results is not an error.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Fetch a document and reduce it to bounded plain text.
    ///
    /// Implementations truncate output at 15000 characters, appending a
    /// `...[content truncated]` marker when the source exceeds the bound.
    async fn extract(&self, url: &str) -> Result<String>;
}

/// Seam for executing one requested tool call against its endpoint.
#[async_trait::async_trait]
pub trait ToolDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        tool: &ToolDescriptor,
        call: &ToolCallRecord,
    ) -> Result<serde_json::Value>;
}
