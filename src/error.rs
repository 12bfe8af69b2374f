use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("You can't request a seat on your own ride")]
    SelfRequest,
    #[error("Ride is no longer active")]
    RideNotActive,
    #[error("No seats available on this ride")]
    NoSeatsAvailable,
    #[error("You already have a live request on this ride")]
    DuplicateRequest,
    #[error("This request has already been handled")]
    AlreadyDecided,
    #[error("Invalid approval link")]
    InvalidToken,
    #[error("This approval link has expired")]
    TokenExpired,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable machine-readable code, independent of the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::SelfRequest => "self_request",
            AppError::RideNotActive => "ride_not_active",
            AppError::NoSeatsAvailable => "no_seats_available",
            AppError::DuplicateRequest => "duplicate_request",
            AppError::AlreadyDecided => "already_decided",
            AppError::InvalidToken => "invalid_token",
            AppError::TokenExpired => "token_expired",
            AppError::Validation(_) => "validation",
            AppError::Internal | AppError::InternalWithMsg(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let sql_code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    // The only unique index hit on a user-driven write path is
                    // the live-request-per-passenger guard.
                    if sql_code == "2067" || sql_code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": AppError::DuplicateRequest.to_string(),
                                "code": AppError::DuplicateRequest.code(),
                            })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            // One opaque message for every authorization failure: the caller
            // must not learn whether a token was otherwise valid.
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::SelfRequest => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::RideNotActive
            | AppError::NoSeatsAvailable
            | AppError::DuplicateRequest
            | AppError::AlreadyDecided => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidToken | AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
