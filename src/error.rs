use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{movies::repo::StoreError, pages};

/// Errors a request can end with. Form validation problems are not errors:
/// they are reported in the response body with a 200.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    /// Unreadable multipart body; answered with the status axum picks for it
    /// (413 when the body limit was hit).
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => pages::handlers::not_found_page(),
            AppError::Multipart(e) => {
                let status = e.status();
                tracing::warn!(error = %e, %status, "unreadable multipart body");
                (status, Json(json!({ "error": e.body_text() }))).into_response()
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "movie store error");
                internal_error()
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "An internal error occurred" })),
    )
        .into_response()
}
