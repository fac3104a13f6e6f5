use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use rxstock_core::MedicineId;
use rxstock_inventory::{list_alerts, summarize, AlertFilter};
use rxstock_store::PharmacyStore;

use crate::app::{dto, errors};

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    filter: Option<String>,
}

pub async fn list(
    Extension(store): Extension<Arc<dyn PharmacyStore>>,
    Query(query): Query<AlertQuery>,
) -> axum::response::Response {
    let filter = query
        .filter
        .as_deref()
        .map(AlertFilter::from_query)
        .unwrap_or(AlertFilter::All);
    let today = Utc::now().date_naive();

    let entries = match store.list_catalog().await {
        Ok(entries) => entries,
        Err(e) => return errors::store_error_to_response(e),
    };

    let category_names: HashMap<MedicineId, String> = entries
        .iter()
        .filter_map(|entry| {
            entry
                .category
                .as_ref()
                .map(|c| (entry.medicine.id, c.name.clone()))
        })
        .collect();
    let medicines: Vec<_> = entries.into_iter().map(|entry| entry.medicine).collect();

    let summary = summarize(&medicines, today);
    let alerts: Vec<_> = list_alerts(medicines, filter, today)
        .iter()
        .map(|item| {
            dto::alert_to_json(item, category_names.get(&item.id).map(String::as_str), today)
        })
        .collect();

    (
        StatusCode::OK,
        dto::ok(json!({
            "alerts": alerts,
            "summary": dto::alert_summary_to_json(&summary),
            "filter": filter.as_str(),
        })),
    )
        .into_response()
}
