//! HTTP API server implementation

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::{format_elapsed, LanguageTag, TranslationOutcome, TranslationRequest};
use crate::core::pipeline::TranslationService;
use crate::core::text::preview;

/// Application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<TranslationService>,
}

impl AppState {
    /// Wrap a service for sharing across handlers
    pub fn new(service: TranslationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Service information response
#[derive(Serialize)]
struct InfoResponse {
    service: String,
    version: String,
    backend: String,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Supported language entry
#[derive(Serialize)]
struct LanguageInfo {
    name: &'static str,
    code: &'static str,
}

/// Single translation request
#[derive(Deserialize)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: Option<String>,
    /// Target language name, case-insensitive
    pub target_language: Option<String>,
    /// Source language name, english when absent
    pub source_language: Option<String>,
}

/// Single translation response
#[derive(Serialize)]
pub struct TranslateResponse {
    /// Translated text
    pub translation: String,
    /// Source language
    pub source_language: LanguageTag,
    /// Target language
    pub target_language: LanguageTag,
    /// Elapsed time, e.g. `"1.23 seconds"`
    pub processing_time: String,
}

/// Batch translation request
#[derive(Deserialize)]
pub struct BatchTranslateRequest {
    /// Texts to translate independently
    pub texts: Option<Vec<String>>,
    /// Target language name, case-insensitive
    pub target_language: Option<String>,
    /// Source language name, english when absent
    pub source_language: Option<String>,
}

/// Batch translation response
#[derive(Serialize)]
pub struct BatchTranslateResponse {
    /// One outcome per input text
    pub translations: Vec<TranslationOutcome>,
    /// Source language
    pub source_language: LanguageTag,
    /// Target language
    pub target_language: LanguageTag,
    /// Number of outcomes
    pub count: usize,
    /// Elapsed time, e.g. `"1.23 seconds"`
    pub processing_time: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error category, `invalid_request_error` or `api_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// Translation error rendered as an HTTP response
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(TranslationError::Validation {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, "invalid_request_error")
        } else if self.0.is_fatal() {
            (StatusCode::SERVICE_UNAVAILABLE, "api_error")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "api_error")
        };

        if status.is_server_error() {
            warn!("Translation failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: Some(self.0.code().to_string()),
                r#type: Some(kind.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Resolve an optional language field, `default` applying when it is absent
fn parse_language(
    value: Option<&str>,
    field: &str,
    default: Option<LanguageTag>,
) -> Result<LanguageTag, TranslationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(name) => name.parse(),
        None => default.ok_or_else(|| TranslationError::MissingField {
            field: field.to_string(),
        }),
    }
}

/// Service information handler
async fn service_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.service.gateway_name().to_string(),
    })
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Supported languages handler
async fn languages() -> Json<Vec<LanguageInfo>> {
    Json(
        LanguageTag::ALL
            .iter()
            .map(|l| LanguageInfo {
                name: l.name(),
                code: l.model_code(),
            })
            .collect(),
    )
}

/// Single translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(payload) = payload?;

    let text = payload
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| TranslationError::MissingField {
            field: "text".to_string(),
        })?;
    let target = parse_language(payload.target_language.as_deref(), "target_language", None)?;
    let source = parse_language(
        payload.source_language.as_deref(),
        "source_language",
        Some(LanguageTag::English),
    )?;

    info!("Translate request to {}: {}", target, preview(&text, 50));

    let request = TranslationRequest::new(text, target).with_source(source);
    let response = state.service.translate(&request).await?;

    Ok(Json(TranslateResponse {
        translation: response.translation,
        source_language: response.source,
        target_language: response.target,
        processing_time: format_elapsed(response.elapsed),
    }))
}

/// Batch translation handler
async fn batch_translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchTranslateRequest>, JsonRejection>,
) -> Result<Json<BatchTranslateResponse>, ApiError> {
    let Json(payload) = payload?;

    let texts = payload
        .texts
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TranslationError::MissingField {
            field: "texts".to_string(),
        })?;
    let target = parse_language(payload.target_language.as_deref(), "target_language", None)?;
    let source = parse_language(
        payload.source_language.as_deref(),
        "source_language",
        Some(LanguageTag::English),
    )?;

    info!("Batch translate request to {}: {} texts", target, texts.len());

    let response = state.service.translate_batch(&texts, source, target).await?;

    Ok(Json(BatchTranslateResponse {
        count: response.outcomes.len(),
        translations: response.outcomes,
        source_language: response.source,
        target_language: response.target,
        processing_time: format_elapsed(response.elapsed),
    }))
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/languages", get(languages))
        .route("/translate", post(translate))
        .route("/batch_translate", post(batch_translate))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(config: TranslatorConfig) -> anyhow::Result<()> {
    // The model client is created once here and shared by every request
    let service = TranslationService::with_http_backend(&config)?;
    let app = router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::testing::ScriptedGateway;
    use assert_json_diff::{assert_json_eq, assert_json_include};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(gateway: ScriptedGateway) -> Router {
        let config = TranslatorConfig {
            chunk_size: 10,
            overlap: 2,
            chunk_threshold: 12,
            ..Default::default()
        };
        let service = TranslationService::new(Arc::new(gateway), &config).unwrap();
        router(AppState::new(service))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(ScriptedGateway::new()), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_json_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_info_names_backend() {
        let (status, body) = call(app(ScriptedGateway::new()), "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_json_include!(actual: body, expected: json!({ "backend": "scripted" }));
    }

    #[tokio::test]
    async fn test_languages() {
        let (_, body) = call(app(ScriptedGateway::new()), "GET", "/languages", None).await;

        assert_eq!(body.as_array().unwrap().len(), 5);
        assert_json_eq!(body[1], json!({ "name": "hindi", "code": "hi_IN" }));
    }

    #[tokio::test]
    async fn test_translate_uppercase_language() {
        let (status, body) = call(
            app(ScriptedGateway::new()),
            "POST",
            "/translate",
            Some(r#"{"text": "Hello", "target_language": "HINDI"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json_include!(
            actual: body.clone(),
            expected: json!({
                "translation": "[hi_IN] Hello",
                "source_language": "english",
                "target_language": "hindi"
            })
        );
        assert!(body["processing_time"].as_str().unwrap().ends_with(" seconds"));
    }

    #[tokio::test]
    async fn test_translate_long_text_is_chunked() {
        let (status, body) = call(
            app(ScriptedGateway::new()),
            "POST",
            "/translate",
            Some(r#"{"text": "abcdefghijklmnopqrstuvwxyz", "target_language": "tamil"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["translation"],
            "[ta_IN] abcdefghij [ta_IN] ijklmnopqr [ta_IN] qrstuvwxyz [ta_IN] yz"
        );
    }

    #[tokio::test]
    async fn test_translate_validation() {
        let cases = [
            (r#"{"target_language": "hindi"}"#, "text"),
            (r#"{"text": "", "target_language": "hindi"}"#, "text"),
            (r#"{"text": "Hello"}"#, "target_language"),
            (r#"{"text": "Hello", "target_language": "french"}"#, "french"),
            (r#"{"text": "Hello", "target_language": "english"}"#, "english"),
            (r#"not json"#, ""),
        ];

        for (payload, mentions) in cases {
            let (status, body) =
                call(app(ScriptedGateway::new()), "POST", "/translate", Some(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
            assert_eq!(body["error"]["code"], "invalid_request");
            assert!(body["error"]["message"].as_str().unwrap().contains(mentions));
        }
    }

    #[tokio::test]
    async fn test_translate_backend_failure() {
        let (status, body) = call(
            app(ScriptedGateway::new().fail_item("Hello")),
            "POST",
            "/translate",
            Some(r#"{"text": "Hello", "target_language": "hindi"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "api_error");
        assert!(body.get("translation").is_none());
    }

    #[tokio::test]
    async fn test_translate_backend_unavailable() {
        let (status, body) = call(
            app(ScriptedGateway::new().unavailable()),
            "POST",
            "/translate",
            Some(r#"{"text": "Hello", "target_language": "telugu"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "backend_unavailable");
    }

    #[tokio::test]
    async fn test_translate_failed_chunk() {
        let (status, body) = call(
            app(ScriptedGateway::new().fail_group(0)),
            "POST",
            "/translate",
            Some(r#"{"text": "abcdefghijklmnopqrstuvwxyz", "target_language": "tamil"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "chunk_failed");
        assert!(body.get("translation").is_none());
    }

    #[tokio::test]
    async fn test_batch_translate_backend_unavailable() {
        let (status, body) = call(
            app(ScriptedGateway::new().unavailable()),
            "POST",
            "/batch_translate",
            Some(r#"{"texts": ["one", "two"], "target_language": "hindi"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "backend_unavailable");
        assert!(body.get("translations").is_none());
    }

    #[tokio::test]
    async fn test_batch_translate() {
        let (status, body) = call(
            app(ScriptedGateway::new().fail_item("bad")),
            "POST",
            "/batch_translate",
            Some(r#"{"texts": ["one", "bad", "three"], "target_language": "Malayalam"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json_include!(
            actual: body,
            expected: json!({
                "translations": [
                    { "status": "translated", "translation": "[ml_IN] one" },
                    { "status": "failed", "error": "empty generation" },
                    { "status": "translated", "translation": "[ml_IN] three" }
                ],
                "source_language": "english",
                "target_language": "malayalam",
                "count": 3
            })
        );
    }

    #[tokio::test]
    async fn test_batch_translate_requires_texts() {
        for payload in [
            r#"{"target_language": "hindi"}"#,
            r#"{"texts": [], "target_language": "hindi"}"#,
        ] {
            let (status, body) =
                call(app(ScriptedGateway::new()), "POST", "/batch_translate", Some(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"]["message"].as_str().unwrap().contains("texts"));
        }
    }
}
