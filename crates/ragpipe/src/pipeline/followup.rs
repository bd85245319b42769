//! Follow-up question generation, best-effort.

use ragpipe_core::{structured, CompletionBackend, CompletionRequest, FollowUpQuestion};
use serde::Deserialize;

const SYSTEM: &str = "You are an expert at identifying valuable follow-up questions that could enhance understanding or provide additional context. Always respond in valid JSON format.";

fn prompt(query: &str, answer: &str) -> String {
    format!(
        r#"Analyze this question and answer pair to generate potential follow-up questions:

Original Question: {query}

Answer: {answer}

Generate 3 relevant follow-up questions that:
1. Address gaps or ambiguities in the current answer
2. Explore related aspects not covered in the original query
3. Request clarification or additional details on specific points

For each follow-up question, explain why it would be valuable to ask.

Output your suggestions as a JSON object with the following structure:
{{
  "follow_up_questions": [
    {{
      "question": "Text of the follow-up question",
      "rationale": "Why this question would be valuable",
      "priority": 1-5 (where 5 is highest priority)
    }}
  ]
}}"#
    )
}

#[derive(Debug, Deserialize)]
struct FollowUpResponse {
    follow_up_questions: Vec<FollowUpQuestion>,
}

/// Propose follow-up questions, sorted descending by priority.
///
/// Follow-ups never block the pipeline: any failure yields an empty
/// list.
pub async fn generate_follow_ups(
    completion: &dyn CompletionBackend,
    query: &str,
    answer: &str,
) -> Vec<FollowUpQuestion> {
    let req = CompletionRequest::single_turn(SYSTEM, prompt(query, answer), 2_000, 0.7);
    let parsed = match completion.complete(&req).await {
        Ok(c) => structured::from_str_lenient::<FollowUpResponse>(&c.text()),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(mut r) => {
            r.follow_up_questions.sort_by(|a, b| b.priority.cmp(&a.priority));
            r.follow_up_questions
        }
        Err(e) => {
            tracing::warn!(error = %e, "follow-up generation failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testutil::{FailingCompletion, TextCompletion};

    #[tokio::test]
    async fn questions_come_back_sorted_by_priority() {
        let backend = TextCompletion::new(
            r#"{"follow_up_questions": [
                {"question": "low", "rationale": "r1", "priority": 2},
                {"question": "high", "rationale": "r2", "priority": 5},
                {"question": "mid", "rationale": "r3", "priority": 3}
            ]}"#,
        );
        let qs = generate_follow_ups(&backend, "q", "a").await;
        let order: Vec<&str> = qs.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn failure_yields_an_empty_list() {
        let qs = generate_follow_ups(&FailingCompletion, "q", "a").await;
        assert!(qs.is_empty());
    }
}
