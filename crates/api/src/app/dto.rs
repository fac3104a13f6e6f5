//! Request DTOs and JSON mapping helpers.
//!
//! Write payloads deserialize straight into the domain draft types
//! (`MedicineDraft`, `SaleDraft`, `NewUser`, `UserUpdate`), so only the
//! API-specific shapes live here.

use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use rxstock_auth::User;
use rxstock_inventory::{AlertSummary, MedicineItem};
use rxstock_sales::{SalesStatistics, WindowStats};
use rxstock_store::{CatalogEntry, SaleSummary};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn ok_message(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": message.into() }))
}

pub fn medicine_to_json(entry: &CatalogEntry, today: NaiveDate) -> Value {
    let m = &entry.medicine;
    let classification = m.classify(today);
    json!({
        "id": m.id,
        "name": m.name,
        "generic_name": m.generic_name,
        "brand": m.brand,
        "category": entry.category.as_ref().map(|c| c.name.as_str()),
        "category_color": entry.category.as_ref().and_then(|c| c.color.as_deref()),
        "dosage": m.dosage,
        "unit_price": m.unit_price,
        "stock_quantity": m.stock_quantity,
        "reorder_level": m.reorder_level,
        "batch_number": m.batch_number,
        "expiry_date": m.expiry_date,
        "supplier": m.supplier,
        "status": classification.alert_type.inventory_status(),
        "days_to_expiry": classification.days_to_expiry,
        "created_at": m.created_at,
        "updated_at": m.updated_at,
    })
}

pub fn alert_to_json(item: &MedicineItem, category: Option<&str>, today: NaiveDate) -> Value {
    let classification = item.classify(today);
    json!({
        "id": item.id,
        "name": item.name,
        "category": category,
        "stock_quantity": item.stock_quantity,
        "reorder_level": item.reorder_level,
        "expiry_date": item.expiry_date,
        "alert_type": classification.alert_type.as_str(),
        "priority": classification.priority.as_str(),
        "days_to_expiry": classification.days_to_expiry,
    })
}

pub fn alert_summary_to_json(summary: &AlertSummary) -> Value {
    json!({
        "critical_alerts": summary.critical_alerts,
        "low_stock_alerts": summary.low_stock_alerts,
        "expiring_alerts": summary.expiring_alerts,
        "total_alerts": summary.total_alerts,
    })
}

pub fn sale_to_json(summary: &SaleSummary, display_number: u64) -> Value {
    json!({
        "id": summary.sale.id,
        "display_number": display_number,
        "customer_name": summary.sale.customer_name,
        "total_amount": summary.sale.total_amount,
        "sale_date": summary.sale.sale_date,
        "cashier_name": summary.cashier_name,
        "items_count": summary.items_count,
        "created_at": summary.sale.created_at,
    })
}

fn window_to_json(window: &WindowStats) -> Value {
    json!({
        "revenue": window.revenue,
        "transactions": window.transactions,
    })
}

pub fn statistics_to_json(stats: &SalesStatistics) -> Value {
    json!({
        "today": window_to_json(&stats.today),
        "week": window_to_json(&stats.week),
        "month": window_to_json(&stats.month),
        "all_time": window_to_json(&stats.all_time),
    })
}

/// `password_hash` never leaves the server.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "full_name": user.full_name,
        "username": user.username,
        "email": user.email,
        "role": user.role.as_str(),
        "last_login": user.last_login,
        "created_at": user.created_at,
    })
}
