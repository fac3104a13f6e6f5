use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use rxstock_auth::{ensure_not_self_delete, hash_password, NewUser, UserUpdate};
use rxstock_core::UserId;
use rxstock_store::PharmacyStore;

use crate::app::routes::common;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", put(update).delete(delete))
}

pub async fn list(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    if let Err(resp) = common::require_admin(&ctx) {
        return resp;
    }
    match store.list_users().await {
        Ok(users) => {
            let users: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, dto::ok(json!({ "users": users }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    if let Err(resp) = common::require_admin(&ctx) {
        return resp;
    }
    if let Err(e) = body.validate() {
        return errors::store_error_to_response(e.into());
    }
    let password_hash = match hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => return errors::store_error_to_response(e.into()),
    };
    match store.create_user(body, password_hash).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "created user");
            (StatusCode::CREATED, dto::ok(dto::user_to_json(&user))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> axum::response::Response {
    if let Err(resp) = common::require_admin(&ctx) {
        return resp;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = body.validate() {
        return errors::store_error_to_response(e.into());
    }
    let password_hash = match body.new_password.as_deref().map(hash_password) {
        Some(Ok(hash)) => Some(hash),
        Some(Err(e)) => return errors::store_error_to_response(e.into()),
        None => None,
    };
    match store.update_user(id, body, password_hash).await {
        Ok(user) => (StatusCode::OK, dto::ok(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::require_admin(&ctx) {
        return resp;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = ensure_not_self_delete(ctx.user_id(), id) {
        return errors::store_error_to_response(e.into());
    }
    match store.delete_user(id).await {
        Ok(()) => (StatusCode::OK, dto::ok_message("User deleted")).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
