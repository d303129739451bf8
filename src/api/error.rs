//! Shared error handling for API endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::is_cookie_safe_token;

/// API error type with automatic response conversion.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Reject missing or blank token fields, and anything that is not plain
/// token text since the value ends up inside `Set-Cookie`.
pub fn require_token(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let Some(token) = value.filter(|t| !t.trim().is_empty()) else {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    };
    if !is_cookie_safe_token(&token) {
        return Err(ApiError::bad_request(format!("{} is not a valid token", field)));
    }
    Ok(token)
}
