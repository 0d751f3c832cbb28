//! API error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clmm_provider_domain::ProviderError;
use tracing::error;

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The provider refused or failed the operation.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The request body or path could not be interpreted.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Nothing is stored under the requested key.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Provider(err) => match err {
                ProviderError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
                ProviderError::NotAuthorized { .. } => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
                ProviderError::InsufficientBalance(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
                }
                ProviderError::FeeExceedsDeposit { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "FEE_EXCEEDS_DEPOSIT")
                }
                ProviderError::PositionCreationFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "POSITION_CREATION_FAILED")
                }
                ProviderError::PositionCreationTimedOut { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "POSITION_CREATION_TIMED_OUT")
                }
                ProviderError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
