//! API Error Envelope
//! Mission: Map every failure onto the uniform `{"success": false, "message"}` body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Every way a request can fail, with the status and user-facing message
/// fixed per variant. Internals never leak: anything unexpected collapses
/// into `Internal` after being logged server-side.
#[derive(Debug)]
pub enum ApiError {
    /// Field-shape violations; carries every violated field's message.
    Validation(Vec<String>),
    MissingCredentials,
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    /// Token verified but its subject no longer exists.
    UserGone,
    Forbidden,
    EmailTaken,
    /// Forgot-password lookup miss.
    EmailNotFound,
    /// Reset-password subject miss.
    UserNotFound,
    ShippingNotFound,
    OrderNotFound,
    ResetTokenInvalid,
    Internal,
}

impl ApiError {
    fn parts(self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(fields) => (StatusCode::BAD_REQUEST, fields.join(", ")),
            ApiError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "Please enter email & password".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid Email or Password".to_string(),
            ),
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Please login to access this resource".to_string(),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            ApiError::UserGone => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Access denied".to_string()),
            ApiError::EmailTaken => (StatusCode::CONFLICT, "User already exists".to_string()),
            ApiError::EmailNotFound => (
                StatusCode::NOT_FOUND,
                "User not found with this email".to_string(),
            ),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ApiError::ShippingNotFound => (
                StatusCode::NOT_FOUND,
                "Shipping order not found".to_string(),
            ),
            ApiError::OrderNotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            ApiError::ResetTokenInvalid => (
                StatusCode::BAD_REQUEST,
                "Password reset token is invalid or has expired".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Internal error: {:#}", err);
        ApiError::Internal
    }
}
