use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::info;

use crate::models::{AppState, DocumentCreate, DocumentResponse};
use crate::routes::validated;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/documents/", post(create_document))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        .route("/collection/", delete(delete_collection))
        .with_state(state)
}

async fn create_document(
    State(state): State<AppState>,
    payload: Result<Json<DocumentCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let request = validated(payload)?;

    let ids = state
        .store
        .add_document_chunks(&request.content, request.metadata.as_ref(), request.use_splitter)
        .await?;
    info!(count = ids.len(), "Document created");

    let id = *ids
        .first()
        .ok_or_else(|| AppError::Internal("no document was stored".to_string()))?;
    let response = DocumentResponse {
        id,
        ids: Some(ids),
        content: request.content,
        metadata: request.metadata,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DocumentResponse>> {
    let document = state.store.get_document(id).await?;
    Ok(Json(document.into()))
}

async fn delete_document(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.store.delete_document(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_collection(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.delete_collection().await?;
    Ok(StatusCode::NO_CONTENT)
}
