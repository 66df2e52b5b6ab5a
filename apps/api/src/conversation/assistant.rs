//! The AI collaborator behind the conversation session.
//!
//! `AppState` holds an `Arc<dyn Assistant>`; the production backend is `LlmClient`.

use async_trait::async_trait;
use tracing::debug;

use crate::conversation::prompts::build_system_instruction;
use crate::conversation::session::{OutboundRequest, Sender};
use crate::llm_client::{ChatRole, ChatTurn, LlmClient, LlmError};

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Returns the raw reply text for one outbound request.
    async fn respond(&self, request: &OutboundRequest) -> Result<String, LlmError>;
}

fn chat_role(sender: Sender) -> ChatRole {
    match sender {
        Sender::User => ChatRole::User,
        Sender::Assistant => ChatRole::Assistant,
    }
}

/// History in order, then the new user message.
fn chat_turns(request: &OutboundRequest) -> Vec<ChatTurn<'_>> {
    request
        .history
        .iter()
        .map(|turn| ChatTurn {
            role: chat_role(turn.role),
            content: &turn.text,
        })
        .chain(std::iter::once(ChatTurn {
            role: ChatRole::User,
            content: &request.message,
        }))
        .collect()
}

#[async_trait]
impl Assistant for LlmClient {
    async fn respond(&self, request: &OutboundRequest) -> Result<String, LlmError> {
        let system = build_system_instruction(&request.document, request.language)?;
        let turns = chat_turns(request);
        debug!("Sending {} turns to assistant", turns.len());

        let response = self.chat(&system, &turns).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::session::HistoryTurn;
    use crate::document::models::Language;
    use crate::document::seed::seed_document;

    fn request() -> OutboundRequest {
        OutboundRequest {
            history: vec![
                HistoryTurn {
                    role: Sender::Assistant,
                    text: "greeting".to_string(),
                },
                HistoryTurn {
                    role: Sender::User,
                    text: "hi".to_string(),
                },
                HistoryTurn {
                    role: Sender::Assistant,
                    text: "raw reply".to_string(),
                },
            ],
            message: "update my bio".to_string(),
            document: seed_document(Language::En),
            language: Language::En,
        }
    }

    #[test]
    fn test_turns_end_with_new_user_message() {
        let request = request();
        let turns = chat_turns(&request);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].role, ChatRole::Assistant);
        assert_eq!(turns[2].content, "raw reply");
        assert_eq!(turns[3].role, ChatRole::User);
        assert_eq!(turns[3].content, "update my bio");
    }

    #[tokio::test]
    async fn test_llm_backend_without_key_fails() {
        let client = LlmClient::new(None).unwrap();
        let err = client.respond(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
    }
}
