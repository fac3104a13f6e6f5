use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use rxstock_core::MedicineId;
use rxstock_inventory::MedicineDraft;
use rxstock_store::PharmacyStore;

use crate::app::routes::common;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", put(update).delete(delete))
}

pub async fn list(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
) -> axum::response::Response {
    let entries = match store.list_catalog().await {
        Ok(entries) => entries,
        Err(e) => return errors::store_error_to_response(e),
    };
    let categories = match store.list_categories().await {
        Ok(categories) => categories,
        Err(e) => return errors::store_error_to_response(e),
    };

    let today = Utc::now().date_naive();
    let medicines: Vec<_> = entries
        .iter()
        .map(|entry| dto::medicine_to_json(entry, today))
        .collect();

    let total_stock: i64 = entries.iter().map(|e| e.medicine.stock_quantity).sum();
    let total_value: Decimal = entries.iter().map(|e| e.medicine.stock_value()).sum();
    let low_stock_count = entries
        .iter()
        .filter(|e| e.medicine.stock_quantity <= e.medicine.reorder_level)
        .count();

    (
        StatusCode::OK,
        dto::ok(json!({
            "medicines": medicines,
            "summary": {
                "total_medicines": entries.len(),
                "total_stock": total_stock,
                "total_value": total_value,
                "low_stock_count": low_stock_count,
                "categories_count": categories.len(),
            },
        })),
    )
        .into_response()
}

pub async fn create(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Json(body): Json<MedicineDraft>,
) -> axum::response::Response {
    match store.create_medicine(body).await {
        Ok(entry) => {
            tracing::info!(medicine = %entry.medicine.name, "created medicine");
            (
                StatusCode::CREATED,
                dto::ok(dto::medicine_to_json(&entry, Utc::now().date_naive())),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Path(id): Path<String>,
    Json(body): Json<MedicineDraft>,
) -> axum::response::Response {
    let id: MedicineId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match store.update_medicine(id, body).await {
        Ok(entry) => (
            StatusCode::OK,
            dto::ok(dto::medicine_to_json(&entry, Utc::now().date_naive())),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MedicineId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match store.delete_medicine(id).await {
        Ok(()) => (StatusCode::OK, dto::ok_message("Medicine deleted")).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
