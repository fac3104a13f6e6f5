use axum::{routing::get, Router};

pub mod alerts;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod inventory;
pub mod sales;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/alerts", get(alerts::list))
        .route("/dashboard", get(dashboard::overview))
        .nest("/inventory", inventory::router())
        .nest("/sales", sales::router())
        .nest("/users", users::router())
}
