//! HTTP Server for the sent API.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                                 |
//! |--------|---------------|---------------------------------------------|
//! | GET    | `/health`     | Health check                                |
//! | POST   | `/send`       | Upload a tick export (multipart `file`)     |
//! | GET    | `/api/logs`   | SSE stream of pipeline logs                 |

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::ClimbingSummary;
use crate::pipeline::summarize_bytes;

/// Multipart field carrying the export.
pub const FILE_FIELD: &str = "file";

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/send", post(upload_export))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let app = router(&config);
    let addr = config.addr();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_info(format!("🚀 sent server running on http://{}", addr));
    log_info("POST /send      - Upload climbing log CSV");
    log_info("GET  /api/logs  - SSE log stream");
    log_info("GET  /health    - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sent",
        "description": "API for processing yearly climbing data",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "send": "POST /send",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: one export in, one summary out.
///
/// Error bodies carry the upload id under `requestId`, matching the log
/// stream.
async fn upload_export(multipart: Multipart) -> Response {
    let upload_id = Uuid::new_v4();
    match summarize_upload(upload_id, multipart).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => {
            log_error(format!("❌ Upload {} failed: {}", upload_id, err));
            err.into_response_for(upload_id)
        }
    }
}

async fn summarize_upload(
    upload_id: Uuid,
    mut multipart: Multipart,
) -> Result<ClimbingSummary, ServerError> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        file = Some((name, bytes.to_vec()));
    }

    let (name, bytes) = file.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;

    log_info(format!(
        "📄 Upload {}: {} ({} bytes)",
        upload_id,
        name.as_deref().unwrap_or("unnamed"),
        bytes.len()
    ));

    let output = summarize_bytes(&bytes)?;

    Ok(output.summary)
}
