use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use rxstock_auth::{NewUser, User, UserUpdate};
use rxstock_core::{DomainError, MedicineId, SaleId, SaleLineId, UserId};
use rxstock_inventory::{Category, MedicineDraft, MedicineItem};
use rxstock_sales::{Sale, SaleDraft, SaleLine};

use crate::error::{StoreError, StoreResult};
use crate::store::{CatalogEntry, PharmacyStore, SaleSummary};

#[derive(Debug, Default)]
struct State {
    medicines: HashMap<MedicineId, MedicineItem>,
    categories: HashMap<String, Category>,
    sales: HashMap<SaleId, (Sale, Vec<SaleLine>)>,
    users: HashMap<UserId, User>,
}

/// In-memory store backend.
///
/// Intended for tests/dev. One `RwLock` serializes mutations, so the
/// all-or-nothing requirement reduces to check-then-apply under the write
/// guard: nothing is mutated until every check has passed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned() -> StoreError {
    StoreError::Database("lock poisoned".to_string())
}

impl State {
    fn resolve_category(&mut self, name: Option<&str>) -> Option<Category> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;
        Some(
            self.categories
                .entry(name.to_string())
                .or_insert_with(|| Category::auto(name))
                .clone(),
        )
    }

    fn category_of(&self, medicine: &MedicineItem) -> Option<Category> {
        let wanted = medicine.category_id?;
        self.categories.values().find(|c| c.id == wanted).cloned()
    }

    fn credential_taken(&self, username: &str, email: &str, exclude: Option<UserId>) -> bool {
        self.users.values().any(|u| {
            Some(u.id) != exclude && (u.username == username || u.email == email)
        })
    }
}

#[async_trait]
impl PharmacyStore for InMemoryStore {
    async fn list_catalog(&self) -> StoreResult<Vec<CatalogEntry>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        let mut entries: Vec<CatalogEntry> = state
            .medicines
            .values()
            .map(|m| CatalogEntry {
                medicine: m.clone(),
                category: state.category_of(m),
            })
            .collect();
        entries.sort_by(|a, b| a.medicine.name.cmp(&b.medicine.name));
        Ok(entries)
    }

    async fn get_medicine(&self, id: MedicineId) -> StoreResult<MedicineItem> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        state
            .medicines
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found().into())
    }

    async fn create_medicine(&self, draft: MedicineDraft) -> StoreResult<CatalogEntry> {
        draft.validate()?;
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let category = state.resolve_category(draft.category.as_deref());
        let medicine = MedicineItem::create(
            MedicineId::new(),
            draft,
            category.as_ref().map(|c| c.id),
            Utc::now(),
        )?;
        state.medicines.insert(medicine.id, medicine.clone());
        Ok(CatalogEntry { medicine, category })
    }

    async fn update_medicine(
        &self,
        id: MedicineId,
        draft: MedicineDraft,
    ) -> StoreResult<CatalogEntry> {
        draft.validate()?;
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        if !state.medicines.contains_key(&id) {
            return Err(DomainError::not_found().into());
        }
        let category = state.resolve_category(draft.category.as_deref());
        let medicine = state
            .medicines
            .get_mut(&id)
            .ok_or(DomainError::NotFound)?;
        medicine.apply_update(draft, category.as_ref().map(|c| c.id), Utc::now())?;
        Ok(CatalogEntry {
            medicine: medicine.clone(),
            category,
        })
    }

    async fn delete_medicine(&self, id: MedicineId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        if state.medicines.remove(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        // Cascade: drop every line item referencing this medicine.
        for (_, lines) in state.sales.values_mut() {
            lines.retain(|line| line.medicine_id != id);
        }
        tracing::info!(medicine_id = %id, "deleted medicine and referencing sale lines");
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn upsert_category_by_name(&self, name: &str) -> StoreResult<Category> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        state
            .resolve_category(Some(name))
            .ok_or_else(|| DomainError::validation("category name is required").into())
    }

    async fn create_sale(&self, actor: UserId, draft: SaleDraft) -> StoreResult<SaleId> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let sale = Sale::from_draft(SaleId::new(), &draft, actor, Utc::now())?;

        // Stage the per-medicine decrements and verify all of them before
        // touching anything; a medicine referenced twice must cover the
        // combined quantity.
        let mut decrements: HashMap<MedicineId, i64> = HashMap::new();
        for line in &draft.items {
            *decrements.entry(line.medicine_id).or_default() += line.quantity;
        }
        for (&medicine_id, &quantity) in &decrements {
            let medicine = state
                .medicines
                .get(&medicine_id)
                .ok_or(DomainError::NotFound)?;
            if medicine.stock_quantity - quantity < 0 {
                return Err(DomainError::insufficient_stock(medicine_id).into());
            }
        }

        for (&medicine_id, &quantity) in &decrements {
            if let Some(medicine) = state.medicines.get_mut(&medicine_id) {
                medicine.stock_quantity -= quantity;
            }
        }
        let lines: Vec<SaleLine> = draft
            .items
            .iter()
            .map(|line| SaleLine::from_draft(SaleLineId::new(), sale.id, line))
            .collect();
        let sale_id = sale.id;
        state.sales.insert(sale_id, (sale, lines));
        tracing::info!(sale_id = %sale_id, "recorded sale");
        Ok(sale_id)
    }

    async fn delete_sale(&self, id: SaleId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let (_, lines) = state
            .sales
            .remove(&id)
            .ok_or(DomainError::NotFound)?;
        for line in &lines {
            if let Some(medicine) = state.medicines.get_mut(&line.medicine_id) {
                medicine.stock_quantity += line.quantity;
            }
        }
        tracing::info!(sale_id = %id, "deleted sale and restored stock");
        Ok(())
    }

    async fn list_recent_sales(&self, limit: i64) -> StoreResult<Vec<SaleSummary>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        let mut summaries: Vec<SaleSummary> = state
            .sales
            .values()
            .map(|(sale, lines)| SaleSummary {
                cashier_name: state.users.get(&sale.user_id).map(|u| u.full_name.clone()),
                items_count: lines.len() as u64,
                sale: sale.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.sale
                .created_at
                .cmp(&a.sale.created_at)
                .then_with(|| b.sale.id.as_uuid().cmp(a.sale.id.as_uuid()))
        });
        summaries.truncate(limit.max(0) as usize);
        Ok(summaries)
    }

    async fn list_sale_lines(&self, sale_id: SaleId) -> StoreResult<Vec<SaleLine>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .sales
            .get(&sale_id)
            .map(|(_, lines)| lines.clone())
            .unwrap_or_default())
    }

    async fn sale_totals_by_date(&self) -> StoreResult<Vec<(NaiveDate, Decimal)>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .sales
            .values()
            .map(|(sale, _)| (sale.sale_date, sale.total_amount))
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, new: NewUser, password_hash: String) -> StoreResult<User> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let user = User::create(UserId::new(), &new, password_hash, Utc::now())?;
        if state.credential_taken(&user.username, &user.email, None) {
            return Err(DomainError::DuplicateCredential.into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
        password_hash: Option<String>,
    ) -> StoreResult<User> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        update.validate()?;
        if !state.users.contains_key(&id) {
            return Err(DomainError::not_found().into());
        }
        if state.credential_taken(update.username.trim(), update.email.trim(), Some(id)) {
            return Err(DomainError::DuplicateCredential.into());
        }
        let user = state.users.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.apply_update(&update, password_hash)?;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found().into())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        let user = state.users.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }
}
