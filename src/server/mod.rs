//! HTTP upload server.
//!
//! Accepts a PDF as multipart form data, classifies it with a shared
//! [`DocumentClassifier`], and answers with JSON:
//!
//! - `POST /upload` (field `file`) → `{"fileName", "category", "confidence"}`
//! - `GET /health` → `{"status": "ok", "version"}`

mod upload;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classifier::DocumentClassifier;
use crate::types::{Category, Report};

pub use upload::UploadedFile;

/// Rejection message for a missing or non-PDF upload.
pub const INVALID_UPLOAD: &str = "No file uploaded or invalid file type";

struct AppState {
    classifier: DocumentClassifier,
}

/// Successful upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub category: Category,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
}

/// Build the router. Uploads larger than `max_upload_bytes` are rejected.
pub fn router(classifier: DocumentClassifier, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState { classifier });

    Router::new()
        .route("/upload", post(upload_handler))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
    })
}

async fn upload_handler(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let file = match upload::parse_multipart(multipart).await {
        Ok(Some(file)) if file.is_pdf() => file,
        Ok(_) => return error_response(StatusCode::BAD_REQUEST, INVALID_UPLOAD),
        Err(e) => {
            warn!(error = %e, "rejected upload");
            return error_response(StatusCode::BAD_REQUEST, INVALID_UPLOAD);
        }
    };

    // Removed when dropped at the end of the request.
    let temp = match file.persist_temp() {
        Ok(temp) => temp,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    match state.classifier.classify_document(temp.path()).await {
        Report::Classified(result) => {
            info!(
                file = %file.filename,
                category = %result.category,
                confidence = result.confidence,
                "upload classified"
            );
            Json(UploadResponse {
                file_name: file.filename,
                category: result.category,
                confidence: result.confidence,
            })
            .into_response()
        }
        Report::Error { error } => {
            warn!(file = %file.filename, %error, "upload classification failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(Report::error(message))).into_response()
}

/// Serve `router` on `listener` until ctrl-c.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}
