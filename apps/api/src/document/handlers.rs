use std::convert::Infallible;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use tracing::{info, warn};

use crate::document::entries::EntryCollection;
use crate::document::models::{Language, ModuleConfig, ResumeDocument, SectionId};
use crate::document::modules::MoveDirection;
use crate::document::mutation::DispatchOutcome;
use crate::document::snapshot::{export_filename, export_json};
use crate::document::store::{Store, ViewState};
use crate::errors::AppError;
use crate::state::AppState;

const IMPORT_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: ResumeDocument,
    pub view: ViewState,
}

impl DocumentResponse {
    fn from_store(store: &Store) -> Self {
        Self {
            document: store.document().clone(),
            view: store.view().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MutationRequest {
    #[serde(rename = "type")]
    pub mutation_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub outcome: DispatchOutcome,
    pub document: ResumeDocument,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub lang: Language,
}

#[derive(Debug, Serialize)]
pub struct EntryCreatedResponse {
    pub id: String,
    pub document: ResumeDocument,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub index: usize,
    pub direction: MoveDirection,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config: ModuleConfig,
    pub view: ViewState,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub moved: bool,
    pub config: ModuleConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    pub active_section: Option<SectionId>,
    pub language: Option<Language>,
    pub editing: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<DocumentResponse> {
    let store = state.store.lock().await;
    Json(DocumentResponse::from_store(&store))
}

/// GET /api/v1/document/events
///
/// One `document` event with the current state on connect, then one per commit.
pub async fn handle_document_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.store.lock().await.subscribe();
    let stream = WatchStream::new(receiver).map(|document| {
        let event = Event::default()
            .event("document")
            .json_data(document.as_ref())
            .unwrap_or_else(|e| {
                warn!("Failed to encode document event: {e}");
                Event::default().event("error")
            });
        Ok::<_, Infallible>(event)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /api/v1/document/mutations
pub async fn handle_mutation(
    State(state): State<AppState>,
    Json(req): Json<MutationRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut store = state.store.lock().await;
    let outcome = store.mutate(&req.mutation_type, req.data).await?;
    Ok(Json(MutationResponse {
        outcome,
        document: store.document().clone(),
    }))
}

/// POST /api/v1/document/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Json<DocumentResponse> {
    let mut store = state.store.lock().await;
    store.reset(req.lang).await;
    Json(DocumentResponse::from_store(&store))
}

/// GET /api/v1/document/export
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    let document = store.document();
    let body = export_json(document).map_err(|e| AppError::Internal(e.into()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(&document.profile.name)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(body),
    ))
}

/// POST /api/v1/document/import
///
/// Multipart upload; the snapshot is read from the `file` field.
pub async fn handle_import_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(IMPORT_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        info!("Importing snapshot from '{filename}' ({} bytes)", data.len());
        let mut store = state.store.lock().await;
        store.import(&data).await?;
        return Ok(Json(DocumentResponse::from_store(&store)));
    }

    Err(AppError::Validation(format!(
        "Multipart field '{IMPORT_FIELD}' is required"
    )))
}

/// POST /api/v1/document/import/raw
pub async fn handle_import_raw(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut store = state.store.lock().await;
    store.import(&body).await?;
    Ok(Json(DocumentResponse::from_store(&store)))
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/document/:collection/entries
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(collection): Path<EntryCollection>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    let mut store = state.store.lock().await;
    let id = store.add_entry(collection).await?;
    Ok((
        StatusCode::CREATED,
        Json(EntryCreatedResponse {
            id,
            document: store.document().clone(),
        }),
    ))
}

/// DELETE /api/v1/document/:collection/entries/:id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((collection, id)): Path<(EntryCollection, String)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let mut store = state.store.lock().await;
    if !store.remove_entry(collection, &id).await? {
        return Err(AppError::NotFound(format!("Entry {id} not found")));
    }
    Ok(Json(DocumentResponse::from_store(&store)))
}

// ────────────────────────────────────────────────────────────────────────────
// Module configuration & view
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/config/modules/:section/toggle
pub async fn handle_toggle_module(
    State(state): State<AppState>,
    Path(section): Path<SectionId>,
) -> Json<ConfigResponse> {
    let mut store = state.store.lock().await;
    store.toggle_visibility(section).await;
    Json(ConfigResponse {
        config: store.document().config.clone(),
        view: store.view().clone(),
    })
}

/// POST /api/v1/config/modules/move
pub async fn handle_move_module(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Json<MoveResponse> {
    let mut store = state.store.lock().await;
    let moved = store.move_module(req.index, req.direction).await;
    Json(MoveResponse {
        moved,
        config: store.document().config.clone(),
    })
}

/// PUT /api/v1/view
pub async fn handle_update_view(
    State(state): State<AppState>,
    Json(req): Json<ViewUpdate>,
) -> Result<Json<ViewState>, AppError> {
    let mut store = state.store.lock().await;
    if let Some(section) = req.active_section {
        store.set_active_section(section)?;
    }
    if let Some(language) = req.language {
        store.set_language(language);
    }
    if let Some(editing) = req.editing {
        store.set_editing(editing);
    }
    Ok(Json(store.view().clone()))
}
