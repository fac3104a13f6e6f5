//! `rxstock-inventory` — medicine catalog records and the stock/expiry
//! alerting core.
//!
//! Everything in this crate is pure domain logic: records, draft validation,
//! and the classification/aggregation functions that derive alert views from
//! them. Persistence lives in `rxstock-store`.

pub mod alerts;
pub mod category;
pub mod medicine;

pub use alerts::{
    classify, list_alerts, summarize, urgency_rank, AlertFilter, AlertSummary, AlertType,
    Classification, Priority,
};
pub use category::{Category, DEFAULT_CATEGORY_DESCRIPTION};
pub use medicine::{MedicineDraft, MedicineItem, DEFAULT_REORDER_LEVEL};
