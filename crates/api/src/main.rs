use std::sync::Arc;

use rxstock_store::{PharmacyStore, PostgresStore};

#[tokio::main]
async fn main() {
    rxstock_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/rxstock".to_string());
    let store = PostgresStore::connect(&database_url)
        .await
        .expect("failed to connect to database");
    let store: Arc<dyn PharmacyStore> = Arc::new(store);

    let app = rxstock_api::app::build_app(jwt_secret, store);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
