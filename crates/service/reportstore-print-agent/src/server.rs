//! HTTP surface of the print agent

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::print::{PrintError, PrintService};

/// Rendered report PDFs routinely run past the framework's 2 MB default
const MAX_PDF_BYTES: usize = 64 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Print dispatcher used by the `/print` endpoint
    pub printer: Arc<dyn PrintService>,
}

/// Build the agent router with permissive CORS so browser-hosted viewers
/// on any origin can reach the local agent
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/print", post(print_document))
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Accepts a rendered PDF as the multipart form field `file` and forwards
/// it to the local printer
async fn print_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut pdf: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file field: {e}")))?;
            pdf = Some(data.to_vec());
            break;
        }
    }

    let pdf = pdf.ok_or_else(|| ApiError::bad_request("Missing form field 'file'"))?;
    if pdf.is_empty() {
        return Err(ApiError::bad_request("Form field 'file' is empty"));
    }

    info!(bytes = pdf.len(), "received print request");
    state.printer.print_pdf(&pdf).await?;
    Ok(Json(json!({ "status": "printed" })))
}

/// Error responses carry a JSON body of the form `{"detail": "..."}`
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        let status = match err {
            PrintError::InvalidJob(_) => StatusCode::BAD_REQUEST,
            PrintError::Spooler(_) | PrintError::Rejected(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, detail = %self.detail, "print request failed");
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
