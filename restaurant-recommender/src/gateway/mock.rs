use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::LlmGateway;
use crate::error::{GatewayError, RecommendError, Result};

enum Reply {
    Text(String),
    Transport(String),
    MissingCredential,
}

/// Gateway double: returns a fixed reply and records what it was asked.
///
/// **Interaction**: implements [`LlmGateway`]; used by the recommender,
/// service and CLI tests, and by the CLI's `--offline` mode.
pub struct MockGateway {
    reply: Reply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_api_key: Mutex<Option<String>>,
}

impl MockGateway {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_api_key: Mutex::new(None),
        }
    }

    /// Always answers with `text`.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Always fails with a transport-level gateway error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Transport(message.into()))
    }

    /// Always fails as if no API key could be resolved.
    pub fn without_credentials() -> Self {
        Self::with_reply(Reply::MissingCredential)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|prompt| prompt.clone())
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.last_api_key.lock().ok().and_then(|key| key.clone())
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn call(&self, prompt: &str, api_key: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        if let Ok(mut last) = self.last_api_key.lock() {
            *last = api_key.map(String::from);
        }

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Transport(message) => Err(RecommendError::gateway(GatewayError::Transport(
                message.clone(),
            ))),
            Reply::MissingCredential => Err(RecommendError::MissingCredential),
        }
    }
}
