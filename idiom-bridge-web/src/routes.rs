use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use idiom_bridge::{
    DetectedIdiom, DetectedLanguage, Direction, IdiomPair, Language, detect_language,
};
use idiom_bridge_mt::{HybridPipeline, Method, MtError};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<HybridPipeline>,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    /// "en-si", "si-en" or "auto" (the default)
    pub direction: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub source: String,
    pub translation: String,
    pub source_lang: Language,
    pub target_lang: Language,
    pub idioms: Vec<DetectedIdiom>,
    pub idiom_accuracy: f64,
    pub method: Method,
}

#[derive(Serialize)]
pub struct DetectResponse {
    pub success: bool,
    pub idioms: Vec<DetectedIdiom>,
}

#[derive(Serialize)]
pub struct IdiomListResponse {
    pub success: bool,
    pub count: usize,
    pub idioms: Vec<IdiomPair>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<&'static str>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
            error_code: None,
            detected_language: None,
        }),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/detect-idioms", post(detect_idioms))
        .route("/idiom-list", get(idiom_list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn serve_index() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        include_str!("static/index.html"),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Trimmed request text; a missing body or field is a 400
fn required_text(text: Option<String>) -> Result<String, ApiError> {
    text.map(|t| t.trim().to_string())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No text provided"))
}

async fn translate(
    State(state): State<AppState>,
    request: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) =
        request.map_err(|_| api_error(StatusCode::BAD_REQUEST, "No text provided"))?;

    let text = required_text(request.text)?;
    if text.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Empty text"));
    }

    let direction = match request.direction.as_deref().map(str::trim) {
        None | Some("") | Some("auto") => Direction::auto(&text),
        Some(value) => value
            .parse::<Direction>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
    };

    let detected = detect_language(&text);
    if !detected.is_supported() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                success: false,
                error: format!(
                    "Unsupported language detected: {}. \
                     This system only supports English ↔ Sinhala translation.",
                    detected.code()
                ),
                error_code: Some("UNSUPPORTED_LANGUAGE"),
                detected_language: Some(detected.code()),
            }),
        ));
    }

    let result = state
        .pipeline
        .translate(&text, direction)
        .await
        .map_err(|e| {
            warn!("Translation failed ({}): {}", direction, e);
            let status = match &e {
                MtError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            api_error(status, e.to_string())
        })?;

    info!(
        "Translated {} ({} idioms, method {}, accuracy {:.2})",
        direction,
        result.detected_idioms.len(),
        result.method,
        result.idiom_accuracy
    );

    Ok(Json(TranslateResponse {
        success: true,
        source: result.source,
        translation: result.translation,
        source_lang: result.source_lang,
        target_lang: result.target_lang,
        idioms: result.detected_idioms,
        idiom_accuracy: result.idiom_accuracy,
        method: result.method,
    }))
}

async fn detect_idioms(
    State(state): State<AppState>,
    request: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Json(request) =
        request.map_err(|_| api_error(StatusCode::BAD_REQUEST, "No text provided"))?;
    let text = required_text(request.text)?;

    // Mixed, unknown and other Latin-script text is scanned for English idioms
    let language = match detect_language(&text) {
        DetectedLanguage::Sinhala => Language::Sinhala,
        _ => Language::English,
    };

    Ok(Json(DetectResponse {
        success: true,
        idioms: state.pipeline.detect(&text, language),
    }))
}

async fn idiom_list(State(state): State<AppState>) -> Json<IdiomListResponse> {
    let idioms: Vec<IdiomPair> = state.pipeline.list_idioms().cloned().collect();
    Json(IdiomListResponse {
        success: true,
        count: idioms.len(),
        idioms,
    })
}
