//! HTTP API server mirroring the tool surface.
//!
//! Provides REST endpoints for image generation and video job management.

use crate::ark::{ImageRequest, VideoJobRequest};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SkapeError;
use crate::service::MediaService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    service: MediaService,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        service: MediaService::new(settings),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/image", post(generate_image))
        .route("/video/tasks", post(create_video_task))
        .route("/video/tasks/{task_id}", get(query_video_task))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Skape API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Generate Image", "POST /image");
    Output::kv("Create Video Task", "POST /video/tasks");
    Output::kv("Query Video Task", "GET  /video/tasks/:task_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ImageBody {
    prompt: String,
    #[serde(default = "default_image_dim")]
    width: u32,
    #[serde(default = "default_image_dim")]
    height: u32,
    #[serde(default)]
    seed: Option<i64>,
    #[serde(default)]
    watermark: Option<bool>,
}

fn default_image_dim() -> u32 {
    1024
}

#[derive(Serialize)]
struct ImageCreated {
    url: String,
}

#[derive(Deserialize)]
struct VideoTaskBody {
    prompt: String,
    #[serde(default)]
    negative_prompt: Option<String>,
    #[serde(default = "default_video_width")]
    width: u32,
    #[serde(default = "default_video_height")]
    height: u32,
    #[serde(default = "default_video_duration")]
    duration: u32,
    #[serde(default)]
    seed: Option<i64>,
}

fn default_video_width() -> u32 {
    1024
}

fn default_video_height() -> u32 {
    576
}

fn default_video_duration() -> u32 {
    5
}

#[derive(Serialize)]
struct VideoTaskCreated {
    task_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: SkapeError) -> axum::response::Response {
    let status = match &e {
        SkapeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SkapeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SkapeError::Remote { .. } | SkapeError::Transport(_) | SkapeError::Protocol(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageBody>,
) -> impl IntoResponse {
    let mut request = ImageRequest::new(&body.prompt);
    request.width = body.width;
    request.height = body.height;
    request.seed = body.seed;
    request.watermark = body.watermark;

    match state
        .service
        .generate_image(&request, &CancellationToken::new())
        .await
    {
        Ok(url) => Json(ImageCreated { url }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_video_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoTaskBody>,
) -> impl IntoResponse {
    let mut request = VideoJobRequest::new(&body.prompt);
    request.negative_prompt = body.negative_prompt;
    request.width = body.width;
    request.height = body.height;
    request.duration_secs = body.duration;
    request.seed = body.seed;

    match state
        .service
        .create_video_job(&request, &CancellationToken::new())
        .await
    {
        Ok(task_id) => Json(VideoTaskCreated { task_id }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn query_video_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    match state
        .service
        .query_video_job(&task_id, &CancellationToken::new())
        .await
    {
        Ok(outcome) => {
            // PollOutcome serializes with a "state" tag; attach the task id.
            let mut value = serde_json::to_value(&outcome).unwrap_or_default();
            if let Some(map) = value.as_object_mut() {
                map.insert("task_id".to_string(), serde_json::json!(task_id));
            }
            Json(value).into_response()
        }
        Err(e) => error_response(e),
    }
}
