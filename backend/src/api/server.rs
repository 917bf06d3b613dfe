//! HTTP Server for the outlook API.
//!
//! # API Endpoints
//!
//! | Method | Path            | Description                                |
//! |--------|-----------------|--------------------------------------------|
//! | GET    | `/health`       | Health check                               |
//! | GET    | `/outlook.json` | Current dataset as pretty-printed JSON     |
//! | GET    | `/outlook.csv`  | Current dataset as CSV                     |
//! | POST   | `/upload_json`  | Replace the dataset with a JSON array      |
//! | POST   | `/upload_csv`   | Replace the dataset with column-major CSV  |
//! | GET    | `/api/logs`     | SSE stream of service logs                 |
//!
//! Upload failures always answer with `{"success": "NOK", "message": ...}`:
//! 400 when the content is at fault, 500 when storage is.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};

use super::logs::{log_error, log_info, log_warning, LOG_BROADCASTER};
use super::types::ApiResponse;
use crate::config::ServerConfig;
use crate::error::{PersistResult, ReadError, ServerError};
use crate::store::{Format, OutlookStore, UploadBody, UploadSummary};

/// Shared handler state.
pub type AppState = Arc<OutlookStore>;

/// Build the router over a store.
pub fn build_router(store: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/outlook.json", get(download_json))
        .route("/outlook.csv", get(download_csv))
        .route("/upload_json", post(upload_json))
        .route("/upload_csv", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(store)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.socket_addr()).await?;
    let store = Arc::new(OutlookStore::from_config(&config));

    log_info(format!(
        "Outlook server running on http://{}",
        config.socket_addr()
    ));
    log_info(format!(
        "Data directory: {} (min {} years per upload)",
        store.data_dir().display(),
        store.min_years()
    ));

    serve(listener, store).await
}

/// Serve the API on an already bound listener.
pub async fn serve(listener: TcpListener, store: AppState) -> Result<(), ServerError> {
    axum::serve(listener, build_router(store)).await?;
    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "outlook",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "download": ["GET /outlook.json", "GET /outlook.csv"],
            "upload": ["POST /upload_json", "POST /upload_csv"],
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed.
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

async fn upload_json(State(store): State<AppState>, body: Bytes) -> (StatusCode, Json<ApiResponse>) {
    log_info(format!("POST /upload_json ({} bytes)", body.len()));

    let result = match UploadBody::json_from_bytes(&body) {
        Ok(upload) => store.upload(upload).await,
        Err(e) => Err(e),
    };
    upload_response(result)
}

async fn upload_csv(State(store): State<AppState>, body: Bytes) -> (StatusCode, Json<ApiResponse>) {
    log_info(format!("POST /upload_csv ({} bytes)", body.len()));

    let result = match UploadBody::csv_from_bytes(&body) {
        Ok(upload) => store.upload(upload).await,
        Err(e) => Err(e),
    };
    upload_response(result)
}

fn upload_response(result: PersistResult<UploadSummary>) -> (StatusCode, Json<ApiResponse>) {
    match result {
        Ok(summary) => (StatusCode::OK, Json(summary.into())),
        Err(e) if e.is_client_error() => {
            log_warning(format!("Upload rejected: {}", e));
            (StatusCode::BAD_REQUEST, Json(ApiResponse::nok(e.to_string())))
        }
        Err(e) => {
            log_error(format!("Upload failed: {}", e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::nok(e.to_string())),
            )
        }
    }
}

async fn download_json(State(store): State<AppState>) -> Response {
    download(&store, Format::Json).await
}

async fn download_csv(State(store): State<AppState>) -> Response {
    download(&store, Format::Csv).await
}

async fn download(store: &OutlookStore, format: Format) -> Response {
    match store.download(format).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, format.content_type())], bytes).into_response(),
        Err(e @ ReadError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::nok(e.to_string()))).into_response()
        }
        Err(e) => {
            log_error(format!("Download failed: {}", e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::nok(e.to_string())),
            )
                .into_response()
        }
    }
}
