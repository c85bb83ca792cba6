use axum::{extract::State, routing::get, Json, Router};
use tracing::warn;

use crate::models::{AppState, StatusResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status/", get(status))
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let counted = match state.store.ping().await {
        Ok(()) => state.store.count_documents().await,
        Err(e) => Err(e),
    };
    let (database, document_count) = match counted {
        Ok(count) => ("connected", Some(count)),
        Err(e) => {
            warn!(error = %e, "Status check could not reach the database");
            ("unavailable", None)
        }
    };

    Json(StatusResponse {
        status: if document_count.is_some() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
        document_count,
        using_sample_data: state.news.is_sample(),
        bigkinds_api_available: state.config.news.api_key.is_some(),
    })
}
