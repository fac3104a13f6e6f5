use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::dto;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, dto::ok(json!({ "status": "ok" }))).into_response()
}
