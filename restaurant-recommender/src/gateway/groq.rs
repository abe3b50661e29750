use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::credentials::{CredentialSource, EnvCredentials};
use super::{LlmGateway, resolve_api_key};
use crate::error::{GatewayError, RecommendError, Result};
use crate::prompt::SYSTEM_PROMPT;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Keep error bodies short in messages and logs.
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base of the OpenAI-compatible API; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for Groq (or any OpenAI-compatible endpoint).
pub struct GroqGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl GroqGateway {
    /// Gateway with the given settings, falling back to `GROQ_API_KEY`.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Self::with_credentials(config, Arc::new(EnvCredentials::new()))
    }

    pub fn with_credentials(
        config: GatewayConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RecommendError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.config.timeout)
        } else {
            GatewayError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl LlmGateway for GroqGateway {
    async fn call(&self, prompt: &str, api_key: Option<&str>) -> Result<String> {
        let api_key = resolve_api_key(api_key, self.credentials.as_ref())
            .ok_or(RecommendError::MissingCredential)?;

        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Calling LLM service"
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RecommendError::gateway(self.transport_error(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecommendError::gateway(self.transport_error(e)))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%status, "LLM service rate limited the request");
            return Err(RecommendError::gateway(GatewayError::RateLimited(
                truncate(&body),
            )));
        }
        if !status.is_success() {
            warn!(%status, "LLM service returned an error status");
            return Err(RecommendError::gateway(GatewayError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            }));
        }

        let content = extract_content(&body).map_err(RecommendError::gateway)?;
        debug!(response_chars = content.len(), "LLM response received");
        Ok(content)
    }
}

/// Content of the first choice, untouched.
fn extract_content(body: &str) -> std::result::Result<String, GatewayError> {
    let envelope: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON envelope: {e}")))?;

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            GatewayError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::StaticCredentials;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one HTTP response on a local port and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(request);
        });

        (format!("http://{addr}"), rx)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
            let text = String::from_utf8_lossy(&buffer);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buffer.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn gateway_for(base_url: String, key: Option<&str>) -> GroqGateway {
        let credentials = match key {
            Some(key) => StaticCredentials::new(key),
            None => StaticCredentials::none(),
        };
        GroqGateway::with_credentials(
            GatewayConfig {
                base_url,
                timeout: Duration::from_secs(5),
                ..GatewayConfig::default()
            },
            Arc::new(credentials),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        // Nothing listens here; a network attempt would surface as a gateway error.
        let gateway = gateway_for("http://127.0.0.1:9".to_string(), None);

        let err = gateway.call("prompt", None).await.unwrap_err();
        assert!(matches!(err, RecommendError::MissingCredential));

        let err = gateway.call("prompt", Some("  ")).await.unwrap_err();
        assert!(matches!(err, RecommendError::MissingCredential));
    }

    #[tokio::test]
    async fn test_returns_first_choice_content_verbatim() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  1. Restaurant A - Great food\n" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        })
        .to_string();
        let (base_url, request_rx) = serve_once("200 OK", body).await;
        let gateway = gateway_for(base_url, Some("config-key"));

        let text = gateway.call("Find food", Some("explicit-key")).await.unwrap();
        assert_eq!(text, "  1. Restaurant A - Great food\n");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer explicit-key"));
        assert!(request.contains(r#""model":"llama-3.1-8b-instant""#));
        assert!(request.contains(r#""role":"user","content":"Find food""#));
        assert!(request.contains(r#""role":"system""#));
    }

    #[tokio::test]
    async fn test_rate_limit_is_gateway_error() {
        let (base_url, _rx) =
            serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#.to_string()).await;
        let gateway = gateway_for(base_url, Some("key"));

        let err = gateway.call("prompt", None).await.unwrap_err();
        match err {
            RecommendError::Gateway { stage, source } => {
                assert_eq!(stage, "recommendation service");
                assert!(matches!(source, GatewayError::RateLimited(body) if body.contains("slow down")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_gateway_error() {
        let (base_url, _rx) =
            serve_once("401 Unauthorized", r#"{"error":"bad key"}"#.to_string()).await;
        let gateway = gateway_for(base_url, Some("key"));

        let err = gateway.call("prompt", None).await.unwrap_err();
        assert!(matches!(
            err,
            RecommendError::Gateway {
                source: GatewayError::Status { status: 401, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let (base_url, _rx) = serve_once("200 OK", r#"{"choices":[]}"#.to_string()).await;
        let gateway = gateway_for(base_url, Some("key"));

        let err = gateway.call("prompt", None).await.unwrap_err();
        assert!(matches!(
            err,
            RecommendError::Gateway {
                source: GatewayError::MalformedResponse(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let gateway = GroqGateway::with_credentials(
            GatewayConfig {
                base_url: format!("http://{addr}"),
                timeout: Duration::from_millis(200),
                ..GatewayConfig::default()
            },
            Arc::new(StaticCredentials::new("key")),
        )
        .unwrap();

        let err = gateway.call("prompt", None).await.unwrap_err();
        assert!(matches!(
            err,
            RecommendError::Gateway {
                source: GatewayError::Timeout(_),
                ..
            }
        ));
    }

    #[test]
    fn test_extract_content_rejects_non_json() {
        assert!(matches!(
            extract_content("<html>oops</html>"),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_completions_url_joins_cleanly() {
        let config = GatewayConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
    }
}
