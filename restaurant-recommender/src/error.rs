use std::time::Duration;

use thiserror::Error;

/// Stage name attached to failures of the LLM call.
pub const RECOMMENDATION_SERVICE_STAGE: &str = "recommendation service";

/// Rejected user input. Messages are shown to end users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("City is required")]
    EmptyCity,

    #[error("Budget must be positive")]
    NonPositivePrice(i64),

    #[error("Diet must be veg or non-veg")]
    InvalidDiet(String),
}

/// Failure talking to the text-generation service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rate limited by the LLM service: {0}")]
    RateLimited(String),

    #[error("LLM service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("GROQ_API_KEY not found: pass an API key or set the GROQ_API_KEY environment variable")]
    MissingCredential,

    #[error("{stage} error: {source}")]
    Gateway {
        stage: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecommendError {
    pub fn gateway(source: GatewayError) -> Self {
        Self::Gateway {
            stage: RECOMMENDATION_SERVICE_STAGE,
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
