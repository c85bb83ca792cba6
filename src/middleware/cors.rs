// CORS policy from ServerConfig.cors_allowed_origins

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::ServerConfig;

/// `*` anywhere in the list allows every origin.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if server.cors_allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn server(origins: &[&str]) -> ServerConfig {
        ServerConfig {
            port: 8000,
            host: "127.0.0.1".to_string(),
            cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    async fn allow_origin_for(config: &ServerConfig, origin: &str) -> Option<String> {
        let app = Router::new().route("/", get(|| async { "ok" })).layer(cors_layer(config));
        let response = app
            .oneshot(Request::get("/").header("origin", origin).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin() {
        let config = server(&["*"]);
        assert_eq!(allow_origin_for(&config, "http://x.test").await.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_explicit_origins() {
        let config = server(&["http://a.test", "http://b.test"]);
        assert_eq!(
            allow_origin_for(&config, "http://b.test").await.as_deref(),
            Some("http://b.test")
        );
        assert_eq!(allow_origin_for(&config, "http://evil.test").await, None);
    }
}
