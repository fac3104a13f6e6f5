use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rxstock_auth::{NewUser, User, UserUpdate};
use rxstock_core::{MedicineId, SaleId, UserId};
use rxstock_inventory::{Category, MedicineDraft, MedicineItem};
use rxstock_sales::{Sale, SaleDraft, SaleLine};

use crate::error::StoreResult;

/// A medicine joined with its category (if any), as listings present it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub medicine: MedicineItem,
    pub category: Option<Category>,
}

/// One row of the recent-sales listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    pub sale: Sale,
    /// Full name of the recording user; `None` when the account is gone
    /// (the reference is weak).
    pub cashier_name: Option<String>,
    pub items_count: u64,
}

/// Persistence operations of the pharmacy system.
///
/// Implementations must make `create_sale`, `delete_sale` and
/// `delete_medicine` atomic: a failure part-way through leaves no trace.
/// Derived views (alerts, dashboards, statistics) are computed by the domain
/// layer over the reads exposed here; the store stays a record/transaction
/// layer.
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    // ── inventory ────────────────────────────────────────────────────────

    /// All medicines with their categories, ordered by name.
    async fn list_catalog(&self) -> StoreResult<Vec<CatalogEntry>>;

    async fn get_medicine(&self, id: MedicineId) -> StoreResult<MedicineItem>;

    /// Create a medicine. The draft's category name is resolved via
    /// [`upsert_category_by_name`](Self::upsert_category_by_name).
    async fn create_medicine(&self, draft: MedicineDraft) -> StoreResult<CatalogEntry>;

    /// Update a medicine in place, refreshing `updated_at`. Same category
    /// resolution as `create_medicine`.
    async fn update_medicine(
        &self,
        id: MedicineId,
        draft: MedicineDraft,
    ) -> StoreResult<CatalogEntry>;

    /// Delete a medicine and every sale line item referencing it, as one
    /// all-or-nothing operation. Absent id: `NotFound`, nothing mutated.
    async fn delete_medicine(&self, id: MedicineId) -> StoreResult<()>;

    // ── categories ───────────────────────────────────────────────────────

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    /// Fetch the category with this name, creating it with the default
    /// description on first use.
    async fn upsert_category_by_name(&self, name: &str) -> StoreResult<Category>;

    // ── sales ────────────────────────────────────────────────────────────

    /// Atomically record a sale: header, line items, and one stock decrement
    /// per line. Any decrement that would drive stock negative aborts the
    /// whole transaction with `InsufficientStock` naming the medicine.
    async fn create_sale(&self, actor: UserId, draft: SaleDraft) -> StoreResult<SaleId>;

    /// Atomically restore stock for every line item and remove the sale
    /// (lines cascade). Absent id: `NotFound`, nothing mutated.
    async fn delete_sale(&self, id: SaleId) -> StoreResult<()>;

    /// Most recent sales first (by `created_at`), at most `limit` rows.
    async fn list_recent_sales(&self, limit: i64) -> StoreResult<Vec<SaleSummary>>;

    /// Line items of one sale (empty when the sale does not exist).
    async fn list_sale_lines(&self, sale_id: SaleId) -> StoreResult<Vec<SaleLine>>;

    /// `(sale_date, total_amount)` of every sale, for the reporting
    /// aggregator.
    async fn sale_totals_by_date(&self) -> StoreResult<Vec<(NaiveDate, Decimal)>>;

    // ── users ────────────────────────────────────────────────────────────

    /// All accounts, newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Create an account. Username/email uniqueness is checked before the
    /// write (`DuplicateCredential`).
    async fn create_user(&self, new: NewUser, password_hash: String) -> StoreResult<User>;

    /// Update an account; `password_hash` replaces the credential when
    /// supplied. Uniqueness checks exclude the account itself.
    async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
        password_hash: Option<String>,
    ) -> StoreResult<User>;

    /// Delete an account. The self-delete guard is enforced by the caller,
    /// which knows the acting user.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()>;
}
