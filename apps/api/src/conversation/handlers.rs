use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::conversation::session::{ConversationMessage, SessionState};
use crate::document::mutation::DispatchOutcome;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub messages: Vec<ConversationMessage>,
    pub state: SessionState,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: ConversationMessage,
    pub outcome: DispatchOutcome,
}

/// GET /api/v1/chat
pub async fn handle_get_chat(State(state): State<AppState>) -> Json<ChatResponse> {
    let session = state.session.lock().await;
    Json(ChatResponse {
        messages: session.messages().to_vec(),
        state: session.state(),
    })
}

/// POST /api/v1/chat/messages
///
/// Appends the user turn, waits for the assistant, and returns its reply. While a reply
/// is pending, further sends get 409. The assistant call runs on its own task so the
/// session returns to idle even if this request is dropped.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ConversationMessage>, AppError> {
    let request = {
        let mut session = state.session.lock().await;
        let store = state.store.lock().await;
        let language = store.view().language;
        session.begin_send(&req.text, store.document().clone(), language)?
    };

    let assistant = state.assistant.clone();
    let session = state.session.clone();
    let reply = tokio::spawn(async move {
        let result = assistant.respond(&request).await;
        let mut session = session.lock().await;
        session.complete(result, request.language).clone()
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(reply))
}

/// POST /api/v1/chat/messages/:id/apply
///
/// Dispatches the staged patch of message `id`. The message is marked applied only if
/// the dispatcher accepted the payload; unknown tags count as accepted.
pub async fn handle_apply_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplyResponse>, AppError> {
    let mut session = state.session.lock().await;
    let patch = session.staged_patch(&id)?.clone();

    let outcome = {
        let mut store = state.store.lock().await;
        store.mutate(&patch.mutation_type, patch.data).await?
    };

    let message = session.mark_applied(&id)?.clone();
    info!("Applied staged patch from message {id}");

    Ok(Json(ApplyResponse { message, outcome }))
}
