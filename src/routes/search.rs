use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::models::{AppState, ScoredDocument, SearchQuery};
use crate::routes::validated;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search/", post(search_documents))
        .with_state(state)
}

async fn search_documents(
    State(state): State<AppState>,
    payload: Result<Json<SearchQuery>, JsonRejection>,
) -> AppResult<Json<Vec<ScoredDocument>>> {
    let query = validated(payload)?;
    let results = state
        .store
        .search_similar_documents(&query.query, query.limit, query.score_threshold)
        .await?;
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::embeddings::VectorStoreManager;
    use crate::routes::test_helpers::{json_request, read_json, send};
    use crate::test_support::{test_state, test_state_with, EchoLLM, FailingEmbedder, MemoryRepository};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let state = test_state();
        for content in ["기준금리 동결", "반도체 수출 회복", "저출산 대책 발표", "저출산 통계"] {
            state.store.add_document(content, None).await.unwrap();
        }
        let app = crate::create_router(state);

        let response = send(&app, json_request(Method::POST, "/search/", json!({ "query": "저출산 대책 발표", "limit": 3 }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let hits = read_json(response).await;
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0]["content"], "저출산 대책 발표");
        let scores: Vec<f64> = hits.iter().map(|h| h["score"].as_f64().unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_default_limit_is_five() {
        let state = test_state();
        for i in 0..8 {
            state.store.add_document(&format!("문서 {}", i), None).await.unwrap();
        }
        let app = crate::create_router(state);

        let response = send(&app, json_request(Method::POST, "/search/", json!({ "query": "문서" }))).await;
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_score_threshold_filters_hits() {
        let state = test_state();
        state.store.add_document("완전히 같은 문장", None).await.unwrap();
        state.store.add_document("전혀 관계 없는 내용", None).await.unwrap();
        let app = crate::create_router(state);

        let response = send(
            &app,
            json_request(Method::POST, "/search/", json!({ "query": "완전히 같은 문장", "score_threshold": 0.99 })),
        )
        .await;
        let hits = read_json(response).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["content"], "완전히 같은 문장");
    }

    #[tokio::test]
    async fn test_limit_out_of_range() {
        let app = crate::create_router(test_state());
        for limit in [0, 101] {
            let response = send(&app, json_request(Method::POST, "/search/", json!({ "query": "x", "limit": limit }))).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_is_server_error() {
        let store = VectorStoreManager::new(Arc::new(MemoryRepository::default()), Arc::new(FailingEmbedder));
        let app = crate::create_router(test_state_with(store, Arc::new(EchoLLM::default())));

        let response = send(&app, json_request(Method::POST, "/search/", json!({ "query": "저출산" }))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["error"], "embedding_error");
    }
}
