// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::services::CollaboratorError;
use crate::validation::FieldError;

/// Every failure a controller can report, with its HTTP status and a client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),
    InvalidBody(String),
    Insertion(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::InvalidBody(_) => 400,
            ApiError::Insertion(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::InvalidBody(msg) => msg,
            ApiError::Insertion(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "message": self.message(),
            "status": self.status_code(),
        })
    }
}

impl ApiError {
    /// Joins field violations as `"message: field, message: field"`
    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        let message = field_errors
            .iter()
            .map(|e| format!("{}: {}", e.message, e.field))
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::Validation(message)
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        ApiError::InvalidBody(message.into())
    }

    pub fn insertion(message: impl Into<String>) -> Self {
        ApiError::Insertion(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Corrupt(msg) => {
                tracing::error!("Stored row could not be decoded: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<CollaboratorError> for ApiError {
    fn from(err: CollaboratorError) -> Self {
        tracing::error!("Collaborator failure: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

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
    fn validation_message_joins_every_violation() {
        let err = ApiError::validation(vec![
            FieldError::new("cat_name", "Invalid value"),
            FieldError::new("weight", "must be a positive number"),
        ]);

        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.message(),
            "Invalid value: cat_name, must be a positive number: weight"
        );
    }

    #[test]
    fn body_carries_message_and_status_only() {
        let body = ApiError::not_found("cat 9 not found").to_json();
        assert_eq!(body, json!({ "message": "cat 9 not found", "status": 404 }));
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ApiError::insertion("no user inserted").status_code(), 400);
        assert_eq!(ApiError::invalid_body("bad json").status_code(), 400);
        assert_eq!(ApiError::forbidden("Admin only").status_code(), 403);
        assert_eq!(ApiError::conflict("taken").status_code(), 409);
        assert_eq!(ApiError::internal_server_error("boom").status_code(), 500);
    }

    #[test]
    fn store_failures_hide_internal_details() {
        let err: ApiError = StoreError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Database error occurred");
    }

    #[test]
    fn into_response_uses_matching_status() {
        let response = ApiError::forbidden("token not valid").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
