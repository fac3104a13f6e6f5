use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete as delete_route, get},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use rxstock_core::SaleId;
use rxstock_sales::{reference_date, statistics, SaleDraft};
use rxstock_store::PharmacyStore;

use crate::app::routes::common;
use crate::app::{dto, errors};
use crate::context::ActorContext;

/// Rows returned by the sales listing.
const RECENT_SALES_LIMIT: i64 = 50;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", delete_route(delete))
}

pub async fn list(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
) -> axum::response::Response {
    let totals = match store.sale_totals_by_date().await {
        Ok(totals) => totals,
        Err(e) => return errors::store_error_to_response(e),
    };
    let reference = reference_date(
        totals.iter().map(|(date, _)| *date),
        Utc::now().date_naive(),
    );
    let stats = statistics(&totals, reference);

    let recent = match store.list_recent_sales(RECENT_SALES_LIMIT).await {
        Ok(recent) => recent,
        Err(e) => return errors::store_error_to_response(e),
    };
    // Newest row gets the highest display number, so the listing reads as a
    // running receipt count.
    let count = recent.len() as u64;
    let sales: Vec<_> = recent
        .iter()
        .enumerate()
        .map(|(i, summary)| dto::sale_to_json(summary, count - i as u64))
        .collect();

    (
        StatusCode::OK,
        dto::ok(json!({
            "sales": sales,
            "statistics": dto::statistics_to_json(&stats),
        })),
    )
        .into_response()
}

pub async fn create(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<SaleDraft>,
) -> axum::response::Response {
    match store.create_sale(ctx.user_id(), body).await {
        Ok(sale_id) => {
            (StatusCode::CREATED, dto::ok(json!({ "sale_id": sale_id }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match store.delete_sale(id).await {
        Ok(()) => {
            (StatusCode::OK, dto::ok_message("Sale deleted and stock restored")).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
