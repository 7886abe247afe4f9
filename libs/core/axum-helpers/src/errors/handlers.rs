use super::{AppError, ErrorCode, error_response};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Router fallback rendering the standard problem payload.
pub async fn not_found() -> Response {
    AppError::NotFound("The requested resource was not found".to_string()).into_response()
}

/// Fallback for routes that exist under a different method.
pub async fn method_not_allowed() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::MethodNotAllowed.default_message().to_string(),
        ErrorCode::MethodNotAllowed,
    )
}
