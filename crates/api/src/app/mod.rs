//! HTTP application wiring (Axum router).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//!
//! Every response body uses the `{"success": ..., "data"/"message": ...}`
//! envelope; HTTP status codes still carry the outcome class.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use rxstock_auth::Hs256TokenCodec;
use rxstock_store::PharmacyStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/health` and `/auth/login` are public; everything else requires a valid
/// bearer token.
pub fn build_app(jwt_secret: String, store: Arc<dyn PharmacyStore>) -> Router {
    let codec = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        codec: codec.clone(),
    };

    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(Extension(codec))
        .layer(Extension(store))
}
