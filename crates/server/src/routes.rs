//! Route configuration for the app origin.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, Uri, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use cendres_core::AppConfig;
use serde_json::json;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; style-src 'self' 'unsafe-inline'; \
     img-src 'self' data: https:; font-src 'self' https://fonts.gstatic.com; connect-src 'self'";

#[derive(Clone)]
struct ServerState {
    service: Arc<str>,
    public_dir: PathBuf,
}

/// Build the origin router.
///
/// `/` serves the app shell, `/static` and `/zplace` serve directories, and
/// `/manifest.json` is served from the public directory so the worker can
/// precache it at the root.
pub fn create_router(config: &AppConfig) -> Router {
    let public_dir = config.server.public_dir.clone();
    let state = ServerState { service: Arc::from(config.app_name.as_str()), public_dir: public_dir.clone() };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route_service("/manifest.json", ServeFile::new(public_dir.join("manifest.json")))
        .nest_service("/static", ServeDir::new(&public_dir).not_found_service(not_found.into_service()))
        .nest_service(
            "/zplace",
            ServeDir::new(&config.server.zplace_dir).not_found_service(not_found.into_service()),
        )
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<ServerState>) -> Result<Html<String>, ServerError> {
    let path = state.public_dir.join("index.html");
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ServerError::Internal(format!("{}: {e}", path.display())))?;
    Ok(Html(body))
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": &*state.service,
    }))
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Site {
        _dir: TempDir,
        router: Router,
    }

    fn site(with_index: bool) -> Site {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let zplace = dir.path().join("ZPlace");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::create_dir_all(&zplace).unwrap();
        if with_index {
            std::fs::write(public.join("index.html"), "<!doctype html><title>shell</title>").unwrap();
        }
        std::fs::write(public.join("manifest.json"), r#"{"name":"Cendres"}"#).unwrap();
        std::fs::write(public.join("app.js"), "console.log('ok')").unwrap();
        std::fs::write(zplace.join("ZPlace_Logo_C.I.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let mut config = AppConfig::default();
        config.server.public_dir = public;
        config.server.zplace_dir = zplace;
        Site { router: create_router(&config), _dir: dir }
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let site = site(true);
        let (status, _, body) = get(&site.router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["service"], "Cendres Incandescentes");
        assert!(json["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_index_serves_shell() {
        let site = site(true);
        let (status, headers, body) = get(&site.router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("shell"));
        assert_eq!(headers.get(header::CONTENT_SECURITY_POLICY).unwrap(), CONTENT_SECURITY_POLICY);
    }

    #[tokio::test]
    async fn test_missing_index_is_json_500() {
        let site = site(false);
        let (status, _, body) = get(&site.router, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal server error");
    }

    #[tokio::test]
    async fn test_static_prefixes() {
        let site = site(true);
        assert_eq!(get(&site.router, "/static/app.js").await.0, StatusCode::OK);
        assert_eq!(get(&site.router, "/zplace/ZPlace_Logo_C.I.png").await.0, StatusCode::OK);
        assert_eq!(get(&site.router, "/manifest.json").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_routes_are_json_404() {
        let site = site(true);
        for uri in ["/nope", "/static/missing.css", "/zplace/missing.png"] {
            let (status, _, body) = get(&site.router, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            let json: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "not found");
        }
    }

    #[tokio::test]
    async fn test_gzip_when_accepted() {
        let site = site(true);
        let request = Request::builder()
            .uri("/health")
            .header(header::ACCEPT_ENCODING, "gzip")
            .body(Body::empty())
            .unwrap();
        let response = site.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(header::CONTENT_ENCODING).unwrap(), "gzip");
    }
}
