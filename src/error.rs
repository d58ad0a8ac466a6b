// HTTP API error taxonomy
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized
    Authentication(String),

    // 403 Forbidden
    Authorization(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Unexpected(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Authentication(_) => 401,
            ApiError::Authorization(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Unexpected(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Authentication(msg) => msg,
            ApiError::Authorization(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Unexpected(msg) => msg,
        }
    }

    /// Convert to the standard response envelope body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
            "data": Value::Null,
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ApiError::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        ApiError::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ApiError::Unexpected(message.into())
    }

    /// Standard not-found message for a missing referenced document
    pub fn missing_document(display: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{} with given ID ({}) is not found", display, id))
    }
}

// Convert other error types to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        // Don't expose internal store errors to clients
        tracing::error!("Store error: {}", err);
        ApiError::unexpected("An error occurred while processing your request")
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::InvalidToken => ApiError::authentication("Invalid token"),
            other => {
                tracing::error!("Auth error: {}", other);
                ApiError::unexpected("An error occurred while processing your request")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_: JsonRejection) -> Self {
        ApiError::validation("Request body contains invalid JSON")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ApiError::validation("x").status_code(), 400);
        assert_eq!(ApiError::authentication("x").status_code(), 401);
        assert_eq!(ApiError::authorization("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::unexpected("x").status_code(), 500);
    }

    #[test]
    fn envelope_has_null_data_and_false_success() {
        let body = ApiError::not_found("Genre with given ID (abc) is not found").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Genre with given ID (abc) is not found");
        assert!(body["data"].is_null());
    }

    #[test]
    fn missing_document_message_format() {
        let err = ApiError::missing_document("Movie type", "123");
        assert_eq!(err.message(), "Movie type with given ID (123) is not found");
    }
}
