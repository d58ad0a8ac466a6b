use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that renders the standard envelope:
/// `{ "success": bool, "message": string, "data": ... }`
#[derive(Debug)]
pub struct Envelope<T: Serialize> {
    pub status_code: StatusCode,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Create a successful 200 OK envelope
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// Create a successful 201 Created envelope
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    /// Create a successful envelope with a custom status code
    pub fn with_status(status_code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self { status_code, success: true, message: message.into(), data }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        // Convert data to a JSON Value for the consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "An error occurred while processing your request",
                        "data": Value::Null,
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": self.success,
            "message": self.message,
            "data": data_value,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Result alias used by handlers: success envelope or taxonomy error
pub type ApiResult<T> = Result<Envelope<T>, crate::error::ApiError>;
