use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use rxstock_inventory::summarize;
use rxstock_sales::{reference_date, statistics};
use rxstock_store::PharmacyStore;

use crate::app::{dto, errors};

/// Medicines shown in the recent-activity feed.
const RECENT_ACTIVITY_LIMIT: usize = 10;

pub async fn overview(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
) -> axum::response::Response {
    let entries = match store.list_catalog().await {
        Ok(entries) => entries,
        Err(e) => return errors::store_error_to_response(e),
    };
    let totals = match store.sale_totals_by_date().await {
        Ok(totals) => totals,
        Err(e) => return errors::store_error_to_response(e),
    };

    let today = Utc::now().date_naive();
    let reference = reference_date(totals.iter().map(|(date, _)| *date), today);
    let stats = statistics(&totals, reference);

    let medicines: Vec<_> = entries.into_iter().map(|entry| entry.medicine).collect();
    let alert_summary = summarize(&medicines, today);
    let inventory_value: Decimal = medicines.iter().map(|m| m.stock_value()).sum();

    // Most recently touched records, newest first.
    let mut recent = medicines.clone();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(RECENT_ACTIVITY_LIMIT);
    let recent_activity: Vec<_> = recent
        .iter()
        .map(|m| {
            let classification = m.classify(today);
            json!({
                "id": m.id,
                "name": m.name,
                "stock_quantity": m.stock_quantity,
                "status": classification.alert_type.display_label(),
                "updated_at": m.updated_at,
            })
        })
        .collect();

    (
        StatusCode::OK,
        dto::ok(json!({
            "total_medicines": medicines.len(),
            "inventory_value": inventory_value,
            "alerts": dto::alert_summary_to_json(&alert_summary),
            "sales": dto::statistics_to_json(&stats),
            "recent_activity": recent_activity,
        })),
    )
        .into_response()
}
