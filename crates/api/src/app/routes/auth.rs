use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use serde_json::json;

use rxstock_auth::{verify_password, AuthClaims, Hs256TokenCodec};
use rxstock_store::PharmacyStore;

use crate::app::{dto, errors};

/// Session lifetime issued on login.
const SESSION_TTL_HOURS: i64 = 8;

pub async fn login(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(codec): Extension<Arc<Hs256TokenCodec>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let found = match store.find_user_by_username(body.username.trim()).await {
        Ok(found) => found,
        Err(e) => return errors::store_error_to_response(e),
    };
    let Some(mut user) = found else {
        return errors::json_error(StatusCode::UNAUTHORIZED, errors::INVALID_LOGIN);
    };

    if !verify_password(&body.password, &user.password_hash) {
        tracing::warn!(username = %user.username, "failed login attempt");
        return errors::json_error(StatusCode::UNAUTHORIZED, errors::INVALID_LOGIN);
    }

    let now = Utc::now();
    if let Err(e) = store.record_login(user.id, now).await {
        return errors::store_error_to_response(e);
    }
    user.last_login = Some(now);

    let claims = AuthClaims::issue(user.id, user.role, now, Duration::hours(SESSION_TTL_HOURS));
    let token = match codec.encode(&claims) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode session token");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    tracing::info!(username = %user.username, "login");
    (
        StatusCode::OK,
        dto::ok(json!({
            "token": token,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}
