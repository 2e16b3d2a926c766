//! HTTP interactive surface.
//!
//! Exposes the session over a JSON API: credential entry, document upload,
//! preset questions, free-text questions, and status. One session per
//! server process; each request runs one pipeline pass to completion, so
//! there is no background work and no cancellation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/session` | Gating state, character and fragment counts |
//! | `PUT`  | `/session/key` | Store the API credential for this session |
//! | `POST` | `/session/document` | Upload a PDF (base64) and build the index |
//! | `GET`  | `/questions` | List the configured preset questions |
//! | `POST` | `/ask` | Ask a free-text or preset question |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "missing_credential", "message": "..." } }
//! ```
//!
//! Codes: `bad_request` (400), `missing_credential` (400), `no_document`
//! (400), `extraction_failed` (422), `provider_error` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! front ends can drive the session directly.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::embedding::OpenAiEmbedder;
use crate::extract::ExtractError;
use crate::generate::{Generator, OpenAiGenerator};
use crate::question::QuestionInput;
use crate::session::{GateError, Session};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    session: Arc<RwLock<Session>>,
}

/// Start the HTTP server, binding to `[server].bind`.
///
/// Runs until the process is terminated. The session starts empty; the
/// credential and document arrive through the API.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        session: Arc::new(RwLock::new(Session::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/session", get(handle_session_status))
        .route("/session/key", put(handle_put_key))
        .route("/session/document", post(handle_upload))
        .route("/questions", get(handle_questions))
        .route("/ask", post(handle_ask))
        .layer(cors)
        .with_state(state);

    tracing::info!(addr = %bind_addr, "listening");
    println!("askpdf server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"missing_credential"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn internal(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Map a pipeline failure to the taxonomy: gating failures are client
/// errors, extraction failures reject the upload, and anything left is a
/// downstream provider failure.
fn classify_pipeline_error(err: anyhow::Error) -> AppError {
    if let Some(gate) = err.downcast_ref::<GateError>() {
        let code = match gate {
            GateError::MissingCredential => "missing_credential",
            GateError::MissingDocument => "no_document",
        };
        return AppError::new(StatusCode::BAD_REQUEST, code, gate.to_string());
    }
    if err.downcast_ref::<ExtractError>().is_some() {
        return AppError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "extraction_failed",
            err.to_string(),
        );
    }
    AppError::new(StatusCode::BAD_GATEWAY, "provider_error", err.to_string())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /session ============

/// Gating state plus pipeline counters for the current session.
#[derive(Serialize)]
struct SessionStatusResponse {
    has_credential: bool,
    has_document: bool,
    characters: Option<usize>,
    fragments: Option<usize>,
}

async fn handle_session_status(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    let session = state.session.read().await;
    let knowledge = session.knowledge();
    Json(SessionStatusResponse {
        has_credential: session.has_credential(),
        has_document: knowledge.is_some(),
        characters: knowledge.map(|k| k.char_count),
        fragments: knowledge.map(|k| k.index.len()),
    })
}

// ============ PUT /session/key ============

#[derive(Deserialize)]
struct PutKeyRequest {
    key: String,
}

#[derive(Serialize)]
struct OkResponse {
    status: String,
}

/// Store the credential in session memory. It is never persisted and never
/// echoed back.
async fn handle_put_key(
    State(state): State<AppState>,
    Json(req): Json<PutKeyRequest>,
) -> Result<Json<OkResponse>, AppError> {
    if req.key.trim().is_empty() {
        return Err(bad_request("key must not be empty"));
    }
    let mut session = state.session.write().await;
    session.set_api_key(req.key);
    tracing::info!("session credential updated");
    Ok(Json(OkResponse {
        status: "ok".to_string(),
    }))
}

// ============ POST /session/document ============

#[derive(Deserialize)]
struct UploadRequest {
    filename: String,
    /// PDF bytes, base64-encoded (standard alphabet).
    content_base64: String,
}

#[derive(Serialize)]
struct UploadResponse {
    filename: String,
    characters: usize,
    fragments: usize,
    /// True when the upload matched the current document and no work ran.
    reused: bool,
}

async fn handle_upload(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.content_base64)
        .map_err(|e| bad_request(format!("invalid base64 content: {}", e)))?;

    let mut session = state.session.write().await;
    let api_key = session
        .api_key()
        .map_err(classify_pipeline_error)?
        .to_string();
    let embedder = OpenAiEmbedder::new(&state.config.embedding, &api_key)
        .map_err(|e| internal(e.to_string()))?;

    let summary = session
        .load_document(&bytes, &state.config, &embedder)
        .await
        .map_err(|e| {
            tracing::warn!(filename = %req.filename, error = %e, "upload failed");
            classify_pipeline_error(e)
        })?;

    tracing::info!(
        filename = %req.filename,
        characters = summary.char_count,
        fragments = summary.fragment_count,
        reused = summary.reused,
        "document processed"
    );

    Ok(Json(UploadResponse {
        filename: req.filename,
        characters: summary.char_count,
        fragments: summary.fragment_count,
        reused: summary.reused,
    }))
}

// ============ GET /questions ============

#[derive(Serialize)]
struct QuestionsResponse {
    presets: Vec<String>,
}

async fn handle_questions(State(state): State<AppState>) -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        presets: state.config.questions.presets.clone(),
    })
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    /// Free-text question; wins over `preset` when non-blank.
    question: Option<String>,
    /// Index into the preset list.
    preset: Option<usize>,
}

#[derive(Serialize)]
struct AskResponse {
    question: String,
    answer: String,
    model: String,
    fragments_used: usize,
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let input = QuestionInput::from_parts(req.question.as_deref(), req.preset);
    let question = input
        .resolve(&state.config.questions.presets)
        .map_err(|e| bad_request(e.to_string()))?
        .ok_or_else(|| bad_request("no question provided; type one or choose a preset"))?;

    let session = state.session.read().await;
    let api_key = session
        .api_key()
        .map_err(classify_pipeline_error)?
        .to_string();
    let embedder = OpenAiEmbedder::new(&state.config.embedding, &api_key)
        .map_err(|e| internal(e.to_string()))?;
    let generator = OpenAiGenerator::new(&state.config.generation, &api_key)
        .map_err(|e| internal(e.to_string()))?;

    let outcome = session
        .ask(&question, &state.config, &embedder, &generator)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "question failed");
            classify_pipeline_error(e)
        })?;

    tracing::info!(fragments = outcome.fragments_used.len(), "question answered");

    Ok(Json(AskResponse {
        question,
        answer: outcome.answer,
        model: generator.model_name().to_string(),
        fragments_used: outcome.fragments_used.len(),
    }))
}
