use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use rxstock_core::DomainError;
use rxstock_store::StoreError;

/// Message returned for any failed login attempt. Deliberately the same for
/// unknown usernames and wrong passwords.
pub const INVALID_LOGIN: &str = "Invalid username or password";

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, msg)
        }
        StoreError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, msg)
        }
        StoreError::Domain(e @ DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, e.to_string())
        }
        StoreError::Domain(e @ DomainError::InsufficientStock { .. }) => {
            json_error(StatusCode::CONFLICT, e.to_string())
        }
        StoreError::Domain(e @ DomainError::DuplicateCredential) => {
            json_error(StatusCode::CONFLICT, e.to_string())
        }
        StoreError::Domain(e @ DomainError::Unauthorized) => {
            json_error(StatusCode::FORBIDDEN, e.to_string())
        }
        StoreError::Database(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}
