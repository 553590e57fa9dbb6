//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session expired. Please login again.")]
    SessionExpired,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::Domain(domain_err) => domain_status(domain_err),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::SessionExpired => "session_expired",
            AppError::Domain(domain_err) => domain_err.kind().as_str(),
        }
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ActorNotFound => StatusCode::UNAUTHORIZED,
        DomainError::DuplicateAccount { .. } => StatusCode::CONFLICT,
        DomainError::InvalidBeneficiaryFormat { .. }
        | DomainError::SelfTransferRejected
        | DomainError::InvalidAmount { .. }
        | DomainError::AmountOutOfRange { .. }
        | DomainError::InsufficientFunds { .. }
        | DomainError::InvalidProfile(_)
        | DomainError::RemarksTooLong { .. } => StatusCode::BAD_REQUEST,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let details = match &self {
            AppError::InvalidRequest(msg) => Some(msg.clone()),
            AppError::Domain(DomainError::AccountNotFound(id)) => Some(id.clone()),
            AppError::Domain(DomainError::InsufficientFunds {
                required,
                available,
            }) => Some(format!("required {}, available {}", required, available)),
            _ => None,
        };

        // Internals never reach the client verbatim
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with internal error");
            "Transaction failed due to system error. Please try again later.".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            success: false,
            error,
            error_code: self.error_code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
