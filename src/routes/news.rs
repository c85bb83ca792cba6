use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};

use crate::embeddings::NewsImport;
use crate::models::{AppState, CategoriesResponse, NewsImportRequest, NewsImportResponse};
use crate::routes::validated;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/import-news/", post(import_news))
        .route("/news-categories/", get(news_categories))
        .with_state(state)
}

/// Import outcomes, failures included, are reported in the response body.
async fn import_news(
    State(state): State<AppState>,
    payload: Result<Json<NewsImportRequest>, JsonRejection>,
) -> AppResult<Json<NewsImportResponse>> {
    let request = validated(payload)?;
    let import = NewsImport {
        query: request.query,
        category: request.category,
        limit: request.limit as usize,
        use_splitter: request.use_splitter,
    };

    let outcome = state.store.import_news_data(&state.news, &import).await;
    let ids = outcome.document_ids;

    let response = match outcome.error {
        None if ids.is_empty() => NewsImportResponse {
            success: false,
            message: "No news articles were imported".to_string(),
            imported_count: 0,
            document_ids: ids,
        },
        None => {
            info!(count = ids.len(), "News imported");
            NewsImportResponse {
                success: true,
                message: format!("Imported {} documents", ids.len()),
                imported_count: ids.len(),
                document_ids: ids,
            }
        }
        Some(e) => {
            error!(error = %e, stored = ids.len(), "News import failed");
            NewsImportResponse {
                success: false,
                message: format!("News import failed after storing {} documents: {}", ids.len(), e),
                imported_count: ids.len(),
                document_ids: ids,
            }
        }
    };

    Ok(Json(response))
}

async fn news_categories(State(state): State<AppState>) -> AppResult<Json<CategoriesResponse>> {
    let categories = state.news.get_all_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}
