use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rxstock_core::{CategoryId, DomainError, DomainResult, MedicineId};

/// Reorder threshold applied when a draft does not specify one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// A medicine in the catalog.
///
/// `stock_quantity` is kept non-negative by the sale transaction path: a sale
/// that would drive it below zero is rolled back in full (see
/// `rxstock-store`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineItem {
    pub id: MedicineId,
    pub name: String,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub category_id: Option<CategoryId>,
    pub dosage: Option<String>,
    pub unit_price: Decimal,
    pub stock_quantity: i64,
    pub reorder_level: i64,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MedicineItem {
    /// Materialize a validated draft as a new record.
    pub fn create(
        id: MedicineId,
        draft: MedicineDraft,
        category_id: Option<CategoryId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            generic_name: draft.generic_name,
            brand: draft.brand,
            category_id,
            dosage: draft.dosage,
            unit_price: draft.unit_price,
            stock_quantity: draft.stock_quantity,
            reorder_level: draft.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            batch_number: draft.batch_number,
            expiry_date: draft.expiry_date,
            supplier: draft.supplier,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the record's fields from a validated draft, refreshing
    /// `updated_at`. `created_at` and the id are untouched.
    pub fn apply_update(
        &mut self,
        draft: MedicineDraft,
        category_id: Option<CategoryId>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.generic_name = draft.generic_name;
        self.brand = draft.brand;
        self.category_id = category_id;
        self.dosage = draft.dosage;
        self.unit_price = draft.unit_price;
        self.stock_quantity = draft.stock_quantity;
        self.reorder_level = draft.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL);
        self.batch_number = draft.batch_number;
        self.expiry_date = draft.expiry_date;
        self.supplier = draft.supplier;
        self.updated_at = now;
        Ok(())
    }

    /// Stock valuation of this record (stock × unit price).
    pub fn stock_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.stock_quantity)
    }
}

/// Caller-supplied fields for creating or updating a medicine record.
///
/// `category` is a category *name*; the store resolves it to an id,
/// creating the category on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineDraft {
    pub name: String,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub dosage: Option<String>,
    pub unit_price: Decimal,
    pub stock_quantity: i64,
    pub reorder_level: Option<i64>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub supplier: Option<String>,
}

impl MedicineDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::validation("stock_quantity cannot be negative"));
        }
        if let Some(level) = self.reorder_level {
            if level < 0 {
                return Err(DomainError::validation("reorder_level cannot be negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(name: &str) -> MedicineDraft {
        MedicineDraft {
            name: name.to_string(),
            generic_name: None,
            brand: None,
            category: None,
            dosage: None,
            unit_price: dec!(4.50),
            stock_quantity: 20,
            reorder_level: None,
            batch_number: None,
            expiry_date: None,
            supplier: None,
        }
    }

    #[test]
    fn create_applies_default_reorder_level() {
        let item =
            MedicineItem::create(MedicineId::new(), draft("Paracetamol"), None, Utc::now())
                .unwrap();
        assert_eq!(item.reorder_level, DEFAULT_REORDER_LEVEL);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = MedicineItem::create(MedicineId::new(), draft("   "), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut d = draft("Ibuprofen");
        d.unit_price = dec!(-1);
        assert!(matches!(
            d.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn update_refreshes_updated_at_only() {
        let created = Utc::now();
        let mut item =
            MedicineItem::create(MedicineId::new(), draft("Amoxicillin"), None, created).unwrap();

        let later = created + chrono::Duration::hours(1);
        let mut d = draft("Amoxicillin 500mg");
        d.stock_quantity = 5;
        item.apply_update(d, None, later).unwrap();

        assert_eq!(item.name, "Amoxicillin 500mg");
        assert_eq!(item.stock_quantity, 5);
        assert_eq!(item.created_at, created);
        assert_eq!(item.updated_at, later);
    }
}
