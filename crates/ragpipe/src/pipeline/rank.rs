//! Relevance ranking of search results via the completion service.

use ragpipe_core::{structured, CompletionBackend, CompletionRequest, RankedResult, SearchResult};
use serde::Deserialize;
use std::fmt::Write as _;

/// Explanation attached to every result when ranking fails.
pub const FALLBACK_EXPLANATION: &str = "Ranking failed";
/// Neutral score assigned when ranking fails.
pub const NEUTRAL_SCORE: f64 = 5.0;

const SYSTEM: &str =
    "You are an expert search result evaluator that always responds in valid JSON format.";

fn prompt(results: &[SearchResult], query: &str) -> String {
    let mut listing = String::new();
    for (i, r) in results.iter().enumerate() {
        if i > 0 {
            listing.push_str("\n\n");
        }
        let _ = write!(
            listing,
            "Result {}:\nTitle: {}\nURL: {}\nSnippet: {}",
            i + 1,
            r.title,
            r.url,
            r.snippet
        );
    }
    format!(
        r#"You are an expert search result evaluator. Your task is to rank the following search results based on their relevance to the query: "{query}"

Search Results:
{listing}

For each result, provide:
1. A relevance score from 0-10 (where 10 is most relevant)
2. A brief explanation of why you assigned that score

Format your response as a JSON object with a 'rankings' array of objects containing 'index' (0-based), 'score', and 'explanation' fields.
"#
    )
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    rankings: Vec<RankingEntry>,
}

#[derive(Debug, Deserialize)]
struct RankingEntry {
    index: i64,
    score: f64,
    #[serde(default)]
    explanation: String,
}

fn neutral_fallback(results: &[SearchResult]) -> Vec<RankedResult> {
    results
        .iter()
        .map(|r| RankedResult {
            result: r.clone(),
            relevance_score: NEUTRAL_SCORE,
            explanation: FALLBACK_EXPLANATION.to_string(),
        })
        .collect()
}

/// Rank `results` against `query`, descending by score.
///
/// Indices the ranking response does not resolve to a valid input
/// position are dropped. On any failure the whole input comes back in
/// original order with a neutral score — ranking must degrade, never
/// abort the pipeline.
pub async fn rank_results(
    completion: &dyn CompletionBackend,
    results: &[SearchResult],
    query: &str,
) -> Vec<RankedResult> {
    if results.is_empty() {
        return Vec::new();
    }

    let req = CompletionRequest::single_turn(SYSTEM, prompt(results, query), 8_000, 0.0);
    let parsed = match completion.complete(&req).await {
        Ok(c) => structured::from_str_lenient::<RankingResponse>(&c.text()),
        Err(e) => Err(e),
    };
    let response = match parsed {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "ranking failed; keeping original order with neutral scores");
            return neutral_fallback(results);
        }
    };

    let mut ranked: Vec<RankedResult> = Vec::new();
    for entry in response.rankings {
        let Ok(idx) = usize::try_from(entry.index) else {
            continue;
        };
        let Some(result) = results.get(idx) else {
            continue;
        };
        ranked.push(RankedResult {
            result: result.clone(),
            relevance_score: entry.score,
            explanation: entry.explanation,
        });
    }

    // Stable sort: ties keep the order assigned by the ranking response.
    ranked.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
