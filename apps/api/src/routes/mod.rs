pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::conversation::handlers as chat;
use crate::document::handlers as document;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document API
        .route("/api/v1/document", get(document::handle_get_document))
        .route(
            "/api/v1/document/events",
            get(document::handle_document_events),
        )
        .route(
            "/api/v1/document/mutations",
            post(document::handle_mutation),
        )
        .route("/api/v1/document/reset", post(document::handle_reset))
        .route("/api/v1/document/export", get(document::handle_export))
        .route(
            "/api/v1/document/import",
            post(document::handle_import_upload),
        )
        .route(
            "/api/v1/document/import/raw",
            post(document::handle_import_raw),
        )
        .route(
            "/api/v1/document/:collection/entries",
            post(document::handle_add_entry),
        )
        .route(
            "/api/v1/document/:collection/entries/:id",
            delete(document::handle_remove_entry),
        )
        // Module configuration & view state
        .route(
            "/api/v1/config/modules/:section/toggle",
            post(document::handle_toggle_module),
        )
        .route(
            "/api/v1/config/modules/move",
            post(document::handle_move_module),
        )
        .route("/api/v1/view", put(document::handle_update_view))
        // Conversation API
        .route("/api/v1/chat", get(chat::handle_get_chat))
        .route("/api/v1/chat/messages", post(chat::handle_send_message))
        .route(
            "/api/v1/chat/messages/:id/apply",
            post(chat::handle_apply_patch),
        )
        .with_state(state)
}
