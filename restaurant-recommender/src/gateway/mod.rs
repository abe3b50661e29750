//! Access to the external text-generation service.
//!
//! [`LlmGateway`] is the seam the [`Recommender`](crate::Recommender) talks to.
//! [`GroqGateway`] is the production implementation (OpenAI-compatible chat
//! completions over HTTPS); [`MockGateway`] returns canned text for tests and
//! offline demos.

mod credentials;
mod groq;
mod mock;

use async_trait::async_trait;

use crate::error::Result;

pub use credentials::{CredentialSource, DEFAULT_API_KEY_VAR, EnvCredentials, StaticCredentials};
pub use groq::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, GatewayConfig,
    GroqGateway,
};
pub use mock::MockGateway;

/// Sends one prompt and returns the model's raw text.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// `api_key` takes precedence over the gateway's own credential source.
    /// Implementations make a single attempt; retries are up to the caller.
    async fn call(&self, prompt: &str, api_key: Option<&str>) -> Result<String>;
}

/// Explicit key if non-blank, else whatever the credential source provides.
pub(crate) fn resolve_api_key(
    explicit: Option<&str>,
    fallback: &dyn CredentialSource,
) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .or_else(|| {
            fallback
                .api_key()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
        })
}
