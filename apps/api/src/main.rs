mod config;
mod conversation;
mod document;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::session::ConversationSession;
use crate::document::persistence::{FileSlot, PersistenceSlot, RedisSlot};
use crate::document::store::Store;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career HUD v{}", env!("CARGO_PKG_VERSION"));

    // Persistence slot: Redis when configured, otherwise a JSON file
    let slot = build_slot(&config)?;
    info!("Persistence slot: {}", slot.describe());

    let store = Store::open(slot, config.language).await;
    let session = ConversationSession::new(config.language);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    if llm.has_credential() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("ANTHROPIC_API_KEY not set; assistant replies will report a connection error");
    }

    // Build app state
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        session: Arc::new(Mutex::new(session)),
        assistant: Arc::new(llm),
    };

    // Build router
    // TODO: restrict CORS origins once the dashboard has a fixed host
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_slot(config: &Config) -> Result<Arc<dyn PersistenceSlot>> {
    if let Some(url) = &config.redis_url {
        let client = redis::Client::open(url.as_str())?;
        info!("Redis client initialized");
        return Ok(Arc::new(RedisSlot::new(client)));
    }

    Ok(Arc::new(FileSlot::in_dir(&config.data_dir)))
}
