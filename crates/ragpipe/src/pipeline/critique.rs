//! Self-critique: score the draft answer and produce a refined version.

use ragpipe_core::{structured, AnswerEvaluation, CompletionBackend, CompletionRequest};
use serde::Deserialize;

/// The single issue reported when evaluation itself fails.
pub const FALLBACK_ISSUE: &str = "Error in evaluation process";

/// Context is re-truncated to this many characters for the critique
/// prompt — a second, tighter bound than the extractor's.
const CRITIQUE_CONTEXT_CHARS: usize = 3_000;

const SYSTEM: &str = "You are an expert at evaluating and improving answers based on search context. Always respond in valid JSON format.";

#[derive(Debug, Clone)]
pub struct Critique {
    pub evaluation: AnswerEvaluation,
    pub issues: Vec<String>,
    pub refined_answer: String,
}

#[derive(Debug, Deserialize)]
struct CritiqueResponse {
    evaluation: AnswerEvaluation,
    #[serde(default)]
    issues: Vec<String>,
    refined_answer: String,
}

fn head_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

fn prompt(query: &str, answer: &str, context: &str) -> String {
    let context_head = head_chars(context, CRITIQUE_CONTEXT_CHARS);
    format!(
        r#"Evaluate this answer to the user's query and suggest refinements:

Query: {query}

Answer: {answer}

The answer was generated based on this context information:
{context_head}... [context truncated if necessary]

Assess the answer on these dimensions:
1. Accuracy: Does it correctly reflect the information in the context?
2. Completeness: Does it address all aspects of the query?
3. Clarity: Is it easy to understand?
4. Conciseness: Is it appropriately detailed without unnecessary information?
5. Evidence: Does it cite sources appropriately?

Then, provide a refined version of the answer that addresses any issues you identified.

Output your evaluation as a JSON object with the following structure:
{{
  "evaluation": {{
    "accuracy": 0-10,
    "completeness": 0-10,
    "clarity": 0-10,
    "conciseness": 0-10,
    "evidence": 0-10
  }},
  "issues": ["List of specific issues identified"],
  "refined_answer": "Improved version of the answer"
}}"#
    )
}

/// Evaluate and refine the draft answer.
///
/// On any failure the draft survives unchanged with neutral scores —
/// refinement must never discard the only available answer.
pub async fn evaluate_and_refine(
    completion: &dyn CompletionBackend,
    query: &str,
    answer: &str,
    context: &str,
) -> Critique {
    let req = CompletionRequest::single_turn(SYSTEM, prompt(query, answer, context), 4_000, 0.2);
    let parsed = match completion.complete(&req).await {
        Ok(c) => structured::from_str_lenient::<CritiqueResponse>(&c.text()),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(r) => Critique {
            evaluation: r.evaluation,
            issues: r.issues,
            refined_answer: r.refined_answer,
        },
        Err(e) => {
            tracing::warn!(error = %e, "answer evaluation failed; keeping the draft");
            Critique {
                evaluation: AnswerEvaluation::neutral(),
                issues: vec![FALLBACK_ISSUE.to_string()],
                refined_answer: answer.to_string(),
            }
        }
    }
}
