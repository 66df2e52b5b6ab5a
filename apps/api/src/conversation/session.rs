//! Conversation Session: message history and the `Idle → Sending → Idle` cycle.
//!
//! Sending is split in two so no lock is held while the assistant thinks:
//! `begin_send` appends the user turn and flips to `Sending`; `complete` appends the
//! assistant turn (or the fixed error turn) and flips back to `Idle`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conversation::extraction::{extract_patch, StagedPatch};
use crate::document::models::{Language, ResumeDocument};
use crate::document::seed::labels;
use crate::llm_client::LlmError;

/// Shown in place of a reply when the assistant call fails for any reason.
pub const CONNECTION_ERROR_TEXT: &str = "Connection Error. Neural link unstable.";

const GREETING_ID: &str = "init";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub text: String,
    /// Unmodified assistant reply, replayed as context on later requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<StagedPatch>,
    pub applied: bool,
}

impl ConversationMessage {
    fn new(id: String, sender: Sender, text: String) -> Self {
        Self {
            id,
            text,
            raw_text: None,
            sender,
            timestamp: Utc::now(),
            patch: None,
            applied: false,
        }
    }

    /// The text the assistant should see for this turn.
    pub fn context_text(&self) -> &str {
        self.raw_text.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryTurn {
    pub role: Sender,
    pub text: String,
}

/// Everything the assistant needs for one reply.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub history: Vec<HistoryTurn>,
    pub message: String,
    pub document: ResumeDocument,
    pub language: Language,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A request is already in flight")]
    Busy,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Message {0} not found")]
    NotFound(String),

    #[error("Message {0} carries no update")]
    NoPatch(String),

    #[error("Update from message {0} was already applied")]
    AlreadyApplied(String),
}

pub struct ConversationSession {
    messages: Vec<ConversationMessage>,
    state: SessionState,
}

impl ConversationSession {
    /// Opens with the assistant's greeting in `lang`.
    pub fn new(lang: Language) -> Self {
        let greeting = ConversationMessage::new(
            GREETING_ID.to_string(),
            Sender::Assistant,
            labels(lang).greeting.to_string(),
        );
        Self {
            messages: vec![greeting],
            state: SessionState::Idle,
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Appends the user turn and enters `Sending`.
    ///
    /// The returned request carries the history *before* this turn plus the turn itself.
    pub fn begin_send(
        &mut self,
        text: &str,
        document: ResumeDocument,
        language: Language,
    ) -> Result<OutboundRequest, SendError> {
        if text.trim().is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.state == SessionState::Sending {
            return Err(SendError::Busy);
        }

        let history = self
            .messages
            .iter()
            .map(|m| HistoryTurn {
                role: m.sender,
                text: m.context_text().to_string(),
            })
            .collect();

        self.messages.push(ConversationMessage::new(
            Uuid::new_v4().to_string(),
            Sender::User,
            text.to_string(),
        ));
        self.state = SessionState::Sending;

        Ok(OutboundRequest {
            history,
            message: text.to_string(),
            document,
            language,
        })
    }

    /// Appends the assistant turn for the in-flight request and returns to `Idle`.
    pub fn complete(
        &mut self,
        result: Result<String, LlmError>,
        language: Language,
    ) -> &ConversationMessage {
        let message = match result {
            Ok(raw) => {
                let extraction = extract_patch(&raw, language);
                if let Some(patch) = &extraction.patch {
                    info!("Assistant proposed {}", patch.mutation_type);
                }
                ConversationMessage {
                    raw_text: Some(raw),
                    patch: extraction.patch,
                    ..ConversationMessage::new(
                        Uuid::new_v4().to_string(),
                        Sender::Assistant,
                        extraction.text,
                    )
                }
            }
            Err(e) => {
                warn!("Assistant request failed: {e}");
                ConversationMessage::new(
                    Uuid::new_v4().to_string(),
                    Sender::Assistant,
                    CONNECTION_ERROR_TEXT.to_string(),
                )
            }
        };

        self.state = SessionState::Idle;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    fn find(&self, id: &str) -> Result<&ConversationMessage, ApplyError> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ApplyError::NotFound(id.to_string()))
    }

    /// The patch of message `id`, if it has one that has not been applied yet.
    pub fn staged_patch(&self, id: &str) -> Result<&StagedPatch, ApplyError> {
        let message = self.find(id)?;
        if message.applied {
            return Err(ApplyError::AlreadyApplied(id.to_string()));
        }
        message
            .patch
            .as_ref()
            .ok_or_else(|| ApplyError::NoPatch(id.to_string()))
    }

    /// Flips `applied` once. Call only after the patch was dispatched.
    pub fn mark_applied(&mut self, id: &str) -> Result<&ConversationMessage, ApplyError> {
        self.staged_patch(id)?;
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ApplyError::NotFound(id.to_string()))?;
        message.applied = true;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::seed::seed_document;

    const SKILLS_REPLY: &str = "Sure, here:\n```json\n{\"type\":\"UPDATE_SKILLS\",\"data\":[{\"name\":\"Go\",\"level\":80,\"category\":\"backend\"}]}\n```";

    fn send(session: &mut ConversationSession, text: &str) -> OutboundRequest {
        session
            .begin_send(text, seed_document(Language::En), Language::En)
            .unwrap()
    }

    #[test]
    fn test_new_session_greets() {
        let session = ConversationSession::new(Language::Zh);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id, "init");
        assert_eq!(session.messages()[0].sender, Sender::Assistant);
        assert_eq!(session.messages()[0].text, labels(Language::Zh).greeting);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_send_appends_user_turn_immediately() {
        let mut session = ConversationSession::new(Language::En);
        let request = send(&mut session, "Rewrite my bio");
        assert_eq!(session.state(), SessionState::Sending);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].sender, Sender::User);
        assert_eq!(request.message, "Rewrite my bio");
        assert_eq!(request.history.len(), 1);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut session = ConversationSession::new(Language::En);
        let result = session.begin_send("   ", seed_document(Language::En), Language::En);
        assert!(matches!(result, Err(SendError::EmptyMessage)));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_second_send_while_in_flight_rejected() {
        let mut session = ConversationSession::new(Language::En);
        send(&mut session, "first");
        let result = session.begin_send("second", seed_document(Language::En), Language::En);
        assert!(matches!(result, Err(SendError::Busy)));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_failure_appends_error_turn_without_patch() {
        let mut session = ConversationSession::new(Language::En);
        send(&mut session, "hello");
        let reply = session.complete(Err(LlmError::MissingCredential), Language::En);
        assert_eq!(reply.text, CONNECTION_ERROR_TEXT);
        assert!(reply.patch.is_none());
        assert_eq!(session.state(), SessionState::Idle);

        // The user may simply resend.
        send(&mut session, "hello again");
    }

    #[test]
    fn test_reply_keeps_raw_text_and_stages_patch() {
        let mut session = ConversationSession::new(Language::En);
        send(&mut session, "Replace my skills with Go");
        let reply = session.complete(Ok(SKILLS_REPLY.to_string()), Language::En);
        assert_eq!(reply.text, "Sure, here:");
        assert_eq!(reply.raw_text.as_deref(), Some(SKILLS_REPLY));
        assert_eq!(reply.patch.as_ref().unwrap().mutation_type, "UPDATE_SKILLS");
    }

    #[test]
    fn test_history_replays_raw_text() {
        let mut session = ConversationSession::new(Language::En);
        send(&mut session, "Replace my skills with Go");
        session.complete(Ok(SKILLS_REPLY.to_string()), Language::En);

        let request = send(&mut session, "Make it 90 instead");
        let roles: Vec<Sender> = request.history.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Sender::Assistant, Sender::User, Sender::Assistant]
        );
        assert_eq!(request.history[2].text, SKILLS_REPLY);
    }

    #[test]
    fn test_patch_applies_once() {
        let mut session = ConversationSession::new(Language::En);
        send(&mut session, "Replace my skills with Go");
        let id = session
            .complete(Ok(SKILLS_REPLY.to_string()), Language::En)
            .id
            .clone();

        assert!(session.staged_patch(&id).is_ok());
        assert!(session.mark_applied(&id).unwrap().applied);
        assert!(matches!(
            session.staged_patch(&id),
            Err(ApplyError::AlreadyApplied(_))
        ));
        assert!(matches!(
            session.mark_applied(&id),
            Err(ApplyError::AlreadyApplied(_))
        ));
    }

    #[test]
    fn test_plain_message_has_no_patch() {
        let session = ConversationSession::new(Language::En);
        assert!(matches!(
            session.staged_patch("init"),
            Err(ApplyError::NoPatch(_))
        ));
        assert!(matches!(
            session.staged_patch("missing"),
            Err(ApplyError::NotFound(_))
        ));
    }
}
