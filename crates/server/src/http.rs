//! HTTP Endpoints
//!
//! REST API for the dog assistant.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::{ConnectInfo, Json, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    BoxError, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use dog_assistant_core::{LocationSuggestion, ProductSuggestion};

use crate::metrics::{metrics_handler, record_catalog_matches, record_error, record_request};
use crate::state::AppState;
use crate::ServerError;

const FALLBACK_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let request_timeout = Duration::from_secs(server.request_timeout_secs);

    let chat_routes = Router::new()
        .route("/process-chat", post(process_chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    Router::new()
        .merge(chat_routes)
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If no configured origin is usable, falls back to localhost:3000
/// - Otherwise, uses the configured origins with credentials allowed
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::warn!("No usable CORS origins configured, defaulting to {}", FALLBACK_ORIGIN);
        parsed_origins.push(HeaderValue::from_static(FALLBACK_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    // Credentials rule out `*`, so methods and headers echo the request
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Render errors raised by tower middleware as `{"detail": ...}`
async fn handle_middleware_error(err: BoxError) -> ServerError {
    if err.is::<tower::timeout::error::Elapsed>() {
        record_error("timeout");
        tracing::warn!("Request timed out");
        ServerError::Timeout
    } else {
        ServerError::Internal(format!("Unhandled internal error: {}", err))
    }
}

/// Refuse requests over the per-client budget
async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let client = client_ip(&request);
    if let Err(e) = state.rate_limiter.check(client) {
        record_error("rate_limited");
        return Err(e.into());
    }
    Ok(next.run(request).await)
}

/// Peer address, or the unspecified address when the server was not
/// started with connect info (tests)
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_response: String,
    pub products: Vec<ProductSuggestion>,
    pub locations: Vec<LocationSuggestion>,
}

/// POST /process-chat
async fn process_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    record_request("process_chat");
    tracing::info!(message_len = request.message.len(), "Processing chat message");

    let result = match state.pipeline.extract(&request.message).await {
        Ok(result) => result,
        Err(e) => {
            record_error("extraction");
            tracing::error!(error = %e, "Chat processing failed");
            return Err(e.into());
        },
    };

    record_catalog_matches(result.suggestions.len());

    Ok(Json(ChatResponse {
        chat_response: result.reply_text,
        products: result.suggestions,
        locations: result.locations,
    }))
}

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// GET /ready
///
/// Ready when the model API answers. The catalog is reported but never
/// blocks readiness, since an empty catalog still serves replies.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let llm_ready = state.pipeline.is_backend_available().await;
    let products = state.pipeline.catalog().len();

    let (status, status_code) = if llm_ready {
        ("ready", StatusCode::OK)
    } else {
        tracing::warn!("Model backend is not reachable");
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "checks": {
                "llm_backend": {
                    "status": if llm_ready { "ok" } else { "unavailable" },
                    "model": state.pipeline.model_name(),
                },
                "catalog": {
                    "status": if products > 0 { "ok" } else { "empty" },
                    "products": products,
                },
            },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Method;
    use std::sync::Arc;
    use tower::ServiceExt;

    use dog_assistant_agent::ExtractionPipeline;
    use dog_assistant_catalog::{Catalog, KeywordMatcher};
    use dog_assistant_config::Settings;
    use dog_assistant_llm::MockBackend;

    fn state(backend: Arc<MockBackend>, settings: Settings) -> AppState {
        let pipeline =
            ExtractionPipeline::new(backend, Arc::new(Catalog::empty()), KeywordMatcher::default());
        AppState::new(settings, pipeline)
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(state(Arc::new(MockBackend::new()), Settings::default()));
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&["http://localhost:3000".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }

    #[test]
    fn test_client_ip_defaults_to_unspecified() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let addr: SocketAddr = "192.168.1.7:5000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(client_ip(&request), addr.ip());
    }

    #[tokio::test]
    async fn test_middleware_errors_map_to_detail() {
        let elapsed: BoxError = Box::new(tower::timeout::error::Elapsed::new());
        let err = handle_middleware_error(elapsed).await;
        assert_eq!(err.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.to_string(), "Request timed out");

        let other: BoxError = "socket closed".into();
        let err = handle_middleware_error(other).await;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("socket closed"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(state(Arc::new(MockBackend::new()), Settings::default()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_ready_follows_backend() {
        let backend = Arc::new(MockBackend::new());
        let app = create_router(state(backend.clone(), Settings::default()));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["checks"]["catalog"]["products"], 0);
        assert_eq!(json["checks"]["llm_backend"]["model"], "mock");

        backend.set_available(false);
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let app = create_router(state(Arc::new(MockBackend::new()), Settings::default()));
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let mut settings = Settings::default();
        settings.server.cors_enabled = true;
        settings.server.cors_origins = vec!["http://localhost:3000".to_string()];
        let app = create_router(state(Arc::new(MockBackend::new()), settings));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/process-chat")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-credentials")
                .unwrap(),
            "true"
        );
    }
}
