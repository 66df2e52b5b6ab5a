use std::sync::Arc;

use tokio::sync::Mutex;

use crate::conversation::assistant::Assistant;
use crate::conversation::session::ConversationSession;
use crate::document::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// When a handler needs both locks it takes `session` first, then `store`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub session: Arc<Mutex<ConversationSession>>,
    /// Pluggable AI backend. Default: `LlmClient`.
    pub assistant: Arc<dyn Assistant>,
}
