//! Error types for the town server's HTTP layer.
//!
//! [`ApiError`] is converted into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation, with a
//! JSON body carrying the message and status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use covey_town::TownError;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No town with this id is hosted here.
    #[error("town not found: {0}")]
    TownNotFound(String),

    /// The town exists but has no area with this id.
    #[error("interactable area not found: {0}")]
    AreaNotFound(String),

    /// The request was understood but is not acceptable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A town operation failed unexpectedly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TownError> for ApiError {
    fn from(error: TownError) -> Self {
        match error {
            TownError::NotFound(id) => Self::AreaNotFound(id.to_string()),
            TownError::IdentityMismatch { .. } | TownError::KindMismatch { .. } => {
                Self::BadRequest(error.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::TownNotFound(_) | Self::AreaNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
