//! Recommender – wraps the three LLM-facing stages that turn an
//! [`IntegrationContext`] into recommendations:
//!
//! 1. render the prompt ([`crate::prompt`]),
//! 2. send it through an [`LlmGateway`],
//! 3. split the answer into [`RecommendationRecord`]s ([`crate::parser`]).
//!
//! ## Sharing a `Recommender`
//! Build it once at startup and share it (it is `Clone`, the gateway sits
//! behind an `Arc`):
//! ```rust,ignore
//! struct AppState {
//!     recommender: Recommender,
//! }
//!
//! let result = state.recommender.get_recommendations(&context).await?;
//! ```
//!
//! Gateway failures propagate unchanged; the parser never fails.

use serde::Serialize;
use std::sync::Arc;

use crate::{
    context::IntegrationContext,
    error::Result,
    gateway::LlmGateway,
    parser::{RecommendationRecord, ResponseParser},
    prompt::{MAX_ROWS, build_prompt_with_limit},
};

/// Raw LLM answer plus the records parsed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationResult {
    pub raw_response: String,
    pub recommendations: Vec<RecommendationRecord>,
}

impl RecommendationResult {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

#[derive(Clone)]
pub struct Recommender {
    gateway: Arc<dyn LlmGateway>,
    parser: Arc<ResponseParser>,
    api_key: Option<String>,
    max_rows: usize,
}

impl Recommender {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            parser: Arc::new(ResponseParser::default()),
            api_key: None,
            max_rows: MAX_ROWS,
        }
    }

    /// Key passed to every gateway call; without it the gateway falls back to
    /// its own credential source.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Prompt → gateway → parse, for one request.
    pub async fn get_recommendations(
        &self,
        context: &IntegrationContext,
    ) -> Result<RecommendationResult> {
        let prompt = build_prompt_with_limit(context, self.max_rows);
        tracing::debug!(
            candidates = context.total_matches(),
            prompt_chars = prompt.len(),
            "Sending recommendation prompt"
        );

        let raw_response = self
            .gateway
            .call(&prompt, self.api_key.as_deref())
            .await?;

        let recommendations = self.parser.parse(&raw_response);
        tracing::info!(
            recommendations = recommendations.len(),
            "Received recommendations"
        );

        Ok(RecommendationResult {
            raw_response,
            recommendations,
        })
    }
}
