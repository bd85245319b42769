//! Search-necessity classification: should this query trigger retrieval?

use ragpipe_core::{structured, CompletionBackend, CompletionRequest, SearchDecision};

/// Reasoning attached when classification fails and we default to search.
pub const FALLBACK_REASONING: &str = "Error in decision process, defaulting to search";

const SYSTEM: &str = "You analyze queries to determine if they require external information from web search. Always respond in valid JSON format.";

fn prompt(query: &str) -> String {
    format!(
        r#"Determine if external information from a web search is necessary to accurately answer this query:

Query: {query}

Consider the following factors:
1. Does the query ask about current events, recent news, or time-sensitive information?
2. Does the query ask for specific data, statistics, or facts that may not be part of your training data?
3. Does the query ask about specific products, services, or websites?
4. Does the query ask about content from specific sources or publications?
5. Is the query about obscure or niche topics that may not be well-covered in your training data?

Output your decision as a JSON object with the following structure:
{{
  "search_needed": true/false,
  "reasoning": "Explanation of why search is or isn't needed",
  "confidence": 0-10 (where 10 is highest confidence)
}}"#
    )
}

/// Fails open: any error (network, malformed JSON) defaults to
/// `search_needed = true`, so a broken classifier never suppresses
/// retrieval.
pub async fn decide_if_search_needed(
    completion: &dyn CompletionBackend,
    query: &str,
) -> SearchDecision {
    let req = CompletionRequest::single_turn(SYSTEM, prompt(query), 1_000, 0.0);
    let parsed = match completion.complete(&req).await {
        Ok(c) => structured::from_str_lenient::<SearchDecision>(&c.text()),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(decision) => decision,
        Err(e) => {
            tracing::warn!(error = %e, "search-necessity classification failed; defaulting to search");
            SearchDecision {
                search_needed: true,
                reasoning: FALLBACK_REASONING.to_string(),
                confidence: None,
            }
        }
    }
}
