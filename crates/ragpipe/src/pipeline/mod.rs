//! The end-to-end query pipeline: decide, search, rank, scrape,
//! synthesize, critique, follow up.
//!
//! No stage is retried and no stage failure aborts the run — each
//! stage degrades internally, so the orchestrator always returns a
//! `PipelineResult` with some answer.

use ragpipe_core::{
    CompletionBackend, PipelineResult, SearchProvider, SearchResult, TextExtractor,
};
use std::sync::Arc;

pub mod answer;
pub mod classify;
pub mod context;
pub mod critique;
pub mod followup;
pub mod rank;

/// The answer used when a required search produced nothing.
pub const NO_RESULTS_ANSWER: &str =
    "I couldn't find any relevant information on the web for your query.";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of web search results to retrieve.
    pub num_search_results: usize,
    /// Maximum number of results to scrape for context.
    pub max_context_results: usize,
    /// When false, the search branch skips self-critique and keeps the
    /// synthesized answer as final (the "plain" pipeline variant).
    pub critique: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_search_results: 5,
            max_context_results: 3,
            critique: true,
        }
    }
}

/// One pipeline instance. Holds configuration only — no per-query
/// state, so concurrent callers can share it or construct their own.
pub struct Pipeline {
    completion: Arc<dyn CompletionBackend>,
    search: Arc<dyn SearchProvider>,
    extractor: Arc<dyn TextExtractor>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn TextExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            completion,
            search,
            extractor,
            config,
        }
    }

    /// Provider errors and "found nothing" are deliberately
    /// indistinguishable here: both become the empty-results branch.
    async fn search_results(&self, query: &str) -> Vec<SearchResult> {
        match self
            .search
            .search(query, self.config.num_search_results)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(provider = self.search.name(), error = %e, "web search failed; treating as no results");
                Vec::new()
            }
        }
    }

    pub async fn process_query(&self, query: &str) -> PipelineResult {
        let completion = &*self.completion;

        let decision = classify::decide_if_search_needed(completion, query).await;
        tracing::info!(
            search_needed = decision.search_needed,
            reasoning = %decision.reasoning,
            "search decision"
        );

        if !decision.search_needed {
            tracing::info!("answering from model knowledge");
            let answer = answer::answer_from_knowledge(completion, query).await;
            let follow_up_questions =
                followup::generate_follow_ups(completion, query, &answer).await;
            return PipelineResult {
                original_query: query.to_string(),
                search_performed: false,
                search_decision_reasoning: decision.reasoning,
                initial_answer: answer.clone(),
                evaluation: None,
                issues: Vec::new(),
                refined_answer: None,
                answer,
                follow_up_questions,
                context: None,
            };
        }

        tracing::info!(query, "searching the web");
        let results = self.search_results(query).await;

        if results.is_empty() {
            tracing::warn!("no search results; returning the fixed fallback answer");
            let answer = NO_RESULTS_ANSWER.to_string();
            let follow_up_questions =
                followup::generate_follow_ups(completion, query, &answer).await;
            return PipelineResult {
                original_query: query.to_string(),
                search_performed: true,
                search_decision_reasoning: decision.reasoning,
                initial_answer: answer.clone(),
                evaluation: None,
                issues: Vec::new(),
                refined_answer: None,
                answer,
                follow_up_questions,
                context: None,
            };
        }

        tracing::info!(count = results.len(), "ranking search results");
        let ranked = rank::rank_results(completion, &results, query).await;

        tracing::info!(
            max = self.config.max_context_results,
            "gathering context from top results"
        );
        let ctx = context::build_context(
            &*self.extractor,
            &ranked,
            self.config.max_context_results,
        )
        .await;

        tracing::info!("generating answer from gathered context");
        let initial_answer = answer::answer_with_context(completion, query, &ctx).await;

        let (evaluation, issues, refined_answer, final_answer) = if self.config.critique {
            tracing::info!("evaluating and refining the answer");
            let critique =
                critique::evaluate_and_refine(completion, query, &initial_answer, &ctx).await;
            (
                Some(critique.evaluation),
                critique.issues,
                Some(critique.refined_answer.clone()),
                critique.refined_answer,
            )
        } else {
            (None, Vec::new(), None, initial_answer.clone())
        };

        let follow_up_questions =
            followup::generate_follow_ups(completion, query, &final_answer).await;

        PipelineResult {
            original_query: query.to_string(),
            search_performed: true,
            search_decision_reasoning: decision.reasoning,
            initial_answer,
            evaluation,
            issues,
            refined_answer,
            answer: final_answer,
            follow_up_questions,
            context: Some(ctx),
        }
    }
}
