//! Answer synthesis: context-grounded and direct-knowledge variants.

use ragpipe_core::{CompletionBackend, CompletionRequest};

const CONTEXT_SYSTEM: &str = "You are a helpful assistant that provides accurate, comprehensive answers based on the context provided.";
const KNOWLEDGE_SYSTEM: &str = "You are a helpful assistant that provides accurate, comprehensive answers based on your knowledge.";

fn apology(e: impl std::fmt::Display) -> String {
    format!("Sorry, I encountered an error while generating your answer: {e}")
}

/// Synthesize an answer grounded in the context blob.
///
/// The model is told to fall back to general knowledge (flagged as
/// such) when the context is insufficient. Never errors: failures
/// become an in-band apology string, so the pipeline always terminates
/// with some answer.
pub async fn answer_with_context(
    completion: &dyn CompletionBackend,
    query: &str,
    context: &str,
) -> String {
    let prompt = format!(
        r#"I need you to answer the following question using the provided context information. If the context doesn't contain relevant information, you can use your general knowledge but clearly indicate when you're doing so.

Question: {query}

Context Information:
{context}

Please provide a comprehensive, accurate answer based primarily on the context provided.
"#
    );
    let req = CompletionRequest::single_turn(CONTEXT_SYSTEM, prompt, 8_000, 0.9);
    match completion.complete(&req).await {
        Ok(c) => c.text(),
        Err(e) => {
            tracing::warn!(error = %e, "answer synthesis failed");
            apology(e)
        }
    }
}

/// Answer from the model's own knowledge (no-search branch).
pub async fn answer_from_knowledge(completion: &dyn CompletionBackend, query: &str) -> String {
    let prompt = format!(
        r#"Please answer this question using your existing knowledge:

Question: {query}

Provide a comprehensive, accurate answer. If you're uncertain about any details, clearly indicate this.
"#
    );
    let req = CompletionRequest::single_turn(KNOWLEDGE_SYSTEM, prompt, 4_000, 0.7);
    match completion.complete(&req).await {
        Ok(c) => c.text(),
        Err(e) => {
            tracing::warn!(error = %e, "direct answer synthesis failed");
            apology(e)
        }
    }
}
