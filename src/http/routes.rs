use std::net::SocketAddr;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::analysis::Prediction;
use crate::context::AppContext;
use crate::error::{ErrorCode, ErrorKind, PredictError};
use crate::questions::INTERVIEW_QUESTIONS;

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state for HTTP handlers.
#[derive(Clone, Copy)]
pub struct HttpState {
    pub ctx: &'static AppContext,
}

impl HttpState {
    pub fn new(ctx: &'static AppContext) -> Self {
        Self { ctx }
    }
}

/// Query parameters for `/predict`.
#[derive(Debug, Default, Deserialize)]
pub struct PredictQuery {
    /// Container hint such as `wav`, `mp3` or `ogg`
    pub format: Option<String>,
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    BadRequest(&'static str),
    Predict(PredictError),
    Internal(String),
}

impl From<PredictError> for HttpServerError {
    fn from(err: PredictError) -> Self {
        Self::Predict(err)
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            Self::Predict(err) => {
                let status = match err.kind() {
                    ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
                    ErrorKind::Decode => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::Lifecycle => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::Capture | ErrorKind::Model => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    serde_json::json!({
                        "error": err.headline(),
                        "code": err.code(),
                        "detail": err.message(),
                    }),
                )
            }
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sample_rate: u32,
    pub max_frames: usize,
}

/// Question list payload.
#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: &'static [&'static str],
}

/// Build the Axum router with all handlers.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/questions", get(questions))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Run the HTTP server loop.
pub async fn run_http_server(state: HttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding HTTP listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP router")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("[Http] Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("[Http] Shutting down");
}

pub async fn health(State(state): State<HttpState>) -> Json<HealthResponse> {
    let config = state.ctx.config();
    Json(HealthResponse {
        status: "ok",
        sample_rate: config.audio.sample_rate,
        max_frames: config.features.max_frames,
    })
}

pub async fn questions() -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: &INTERVIEW_QUESTIONS,
    })
}

pub async fn predict(
    State(state): State<HttpState>,
    Query(query): Query<PredictQuery>,
    body: Bytes,
) -> Result<Json<Prediction>, HttpServerError> {
    if body.is_empty() {
        return Err(HttpServerError::BadRequest("request body must contain audio"));
    }

    let ctx = state.ctx;
    let bytes = body.to_vec();
    let prediction = tokio::task::spawn_blocking(move || {
        ctx.predict_bytes(bytes, query.format.as_deref())
    })
    .await
    .map_err(|err| HttpServerError::Internal(format!("prediction task failed: {err}")))??;

    Ok(Json(prediction))
}
