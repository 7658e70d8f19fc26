use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::reservations::ReservationError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Insufficient capacity: {0}")]
    InsufficientCapacity(String),

    #[error("Database error")]
    DatabaseError(#[from] StoreError),

    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientCapacity(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TransactionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientCapacity(_) => "INSUFFICIENT_CAPACITY",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::TransactionFailure(_) => "TRANSACTION_FAILURE",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientCapacity(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::TransactionFailure(msg) => {
                error!(message = %msg, "Transaction failure");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::PermissionDenied(msg) => AppError::Forbidden(msg),
            ReservationError::InvalidInput(msg) => AppError::ValidationError(msg),
            ReservationError::NotFound(msg) => AppError::NotFound(msg),
            err @ ReservationError::InsufficientCapacity { .. } => {
                AppError::InsufficientCapacity(err.to_string())
            }
            err @ ReservationError::DeadlineExceeded(_) => {
                AppError::TransactionFailure(err.to_string())
            }
            ReservationError::Store(e) => AppError::DatabaseError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Store failures stay in the logs
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientCapacity(msg) => msg.clone(),
            AppError::TransactionFailure(_) => {
                "The reservation could not be completed, please retry".to_string()
            }
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}
