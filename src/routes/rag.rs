use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::models::{AppState, RagQuery, RagResponse};
use crate::routes::validated;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rag/", post(rag_query))
        .with_state(state)
}

async fn rag_query(
    State(state): State<AppState>,
    payload: Result<Json<RagQuery>, JsonRejection>,
) -> AppResult<Json<RagResponse>> {
    let query = validated(payload)?;
    let response = state.rag.answer(&query.query, query.limit).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::rag::generator::NO_DOCUMENTS_ANSWER;
    use crate::routes::test_helpers::{json_request, read_json, send};
    use crate::test_support::{memory_store, test_state, test_state_with, FailingLLM};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_rag_answer_with_sources() {
        let state = test_state();
        state.store.add_document("합계출산율 0.72명 기록", None).await.unwrap();
        let app = crate::create_router(state);

        let response = send(&app, json_request(Method::POST, "/rag/", json!({ "query": "합계출산율 0.72명 기록", "limit": 1 }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert!(body["answer"].as_str().unwrap().starts_with("ANSWER<"));
        assert_eq!(body["sources"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rag_on_empty_store_is_well_formed() {
        let app = crate::create_router(test_state());
        let response = send(&app, json_request(Method::POST, "/rag/", json!({ "query": "무엇이든" }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["answer"], NO_DOCUMENTS_ANSWER);
        assert_eq!(body["sources"], json!([]));
    }

    #[tokio::test]
    async fn test_rag_limit_bounds() {
        let app = crate::create_router(test_state());
        let response = send(&app, json_request(Method::POST, "/rag/", json!({ "query": "q", "limit": 21 }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_llm_failure_is_server_error() {
        let store = memory_store();
        store.add_document("문서", None).await.unwrap();
        let app = crate::create_router(test_state_with(store, Arc::new(FailingLLM)));

        let response = send(&app, json_request(Method::POST, "/rag/", json!({ "query": "문서" }))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["error"], "llm_error");
    }
}
