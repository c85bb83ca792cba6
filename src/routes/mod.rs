//! API Routes
//!
//! - `/documents/` - Document create, read and delete
//! - `/collection/` - Clear every stored document
//! - `/search/` - Similarity search
//! - `/rag/` - Retrieval-augmented answers
//! - `/import-news/`, `/news-categories/` - News ingestion
//! - `/status/` - Service status

pub mod documents;
pub mod health;
pub mod news;
pub mod rag;
pub mod search;

use axum::{extract::rejection::JsonRejection, Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;
use validator::Validate;

use crate::middleware::cors_layer;
use crate::models::AppState;
use crate::types::{AppError, AppResult};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server);

    Router::new()
        .merge(documents::router(state.clone()))
        .merge(search::router(state.clone()))
        .merge(rag::router(state.clone()))
        .merge(news::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Unwrap a JSON body and run its validation rules. Both failures are client errors.
pub(crate) fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    let Json(value) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        response::Response,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// `Value::Null` sends an empty body.
    pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        if body.is_null() {
            builder.body(Body::empty()).unwrap()
        } else {
            builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        }
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    pub async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
