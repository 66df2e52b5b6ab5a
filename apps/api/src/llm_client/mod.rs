//! LLM Client: the single point of entry for all Claude API calls in Career HUD.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! The conversation assistant goes through `LlmClient::chat`.
//!
//! Model: claude-sonnet-4-5 (hardcoded, not configurable)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY not configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior or current turn of a multi-turn conversation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatTurn<'a> {
    pub role: ChatRole,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [ChatTurn<'a>],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The Messages API requires the conversation to open with a user turn, so locally
/// authored assistant turns at the front (the greeting) are dropped.
fn wire_turns<'a>(turns: &'a [ChatTurn<'a>]) -> &'a [ChatTurn<'a>] {
    let start = turns
        .iter()
        .position(|t| t.role == ChatRole::User)
        .unwrap_or(turns.len());
    &turns[start..]
}

/// Wraps the Anthropic Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
}

impl LlmClient {
    /// A missing key is not a startup failure: every call then fails with
    /// `LlmError::MissingCredential`.
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes a multi-turn call to the Claude API.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn chat(
        &self,
        system: &str,
        turns: &[ChatTurn<'_>],
    ) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingCredential)?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: wire_turns(turns),
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: ChatRole, content: &str) -> ChatTurn<'_> {
        ChatTurn { role, content }
    }

    #[test]
    fn test_wire_turns_drops_leading_assistant() {
        let turns = [
            turn(ChatRole::Assistant, "greeting"),
            turn(ChatRole::User, "hi"),
            turn(ChatRole::Assistant, "hello"),
            turn(ChatRole::User, "update my bio"),
        ];
        let wire = wire_turns(&turns);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].content, "hi");
    }

    #[test]
    fn test_wire_turns_keeps_user_first() {
        let turns = [turn(ChatRole::User, "hi")];
        assert_eq!(wire_turns(&turns).len(), 1);
    }

    #[test]
    fn test_request_serializes_roles_lowercase() {
        let turns = [turn(ChatRole::User, "hi")];
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: "sys",
            messages: &turns,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["system"], "sys");
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let client = LlmClient::new(None).unwrap();
        assert!(!client.has_credential());
        let err = client
            .chat("sys", &[turn(ChatRole::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [{"type": "tool_use"}, {"type": "text", "text": "hi"}],
                "usage": {"input_tokens": 1, "output_tokens": 2}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("hi"));
    }
}
