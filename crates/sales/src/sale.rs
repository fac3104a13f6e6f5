use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rxstock_core::{DomainError, DomainResult, MedicineId, SaleId, SaleLineId, UserId};

/// Customer name recorded when the caller supplies none.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// A committed sale header. Line items are owned by the sale and are only
/// ever created or deleted together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub customer_name: String,
    /// Derived: sum of line totals, fixed at creation time.
    pub total_amount: Decimal,
    /// Caller-supplied temporal key used by reporting; distinct from
    /// `created_at`.
    pub sale_date: NaiveDate,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// One line of a sale. `unit_price` is captured at sale time, never re-read
/// from the current catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: SaleLineId,
    pub sale_id: SaleId,
    pub medicine_id: MedicineId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Caller-supplied line of a pending sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineDraft {
    pub medicine_id: MedicineId,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl SaleLineDraft {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Caller-supplied fields of a pending sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_name: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub items: Vec<SaleLineDraft>,
}

impl SaleDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("sale items are required"));
        }
        if self.sale_date.is_none() {
            return Err(DomainError::validation("sale date is required"));
        }
        for line in &self.items {
            if line.quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(DomainError::validation("unit_price cannot be negative"));
            }
        }
        Ok(())
    }

    /// Sum of line totals at the caller-supplied prices.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(SaleLineDraft::line_total).sum()
    }

    pub fn customer(&self) -> &str {
        self.customer_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(WALK_IN_CUSTOMER)
    }
}

impl Sale {
    /// Materialize a validated draft as a sale header.
    pub fn from_draft(
        id: SaleId,
        draft: &SaleDraft,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            customer_name: draft.customer().to_string(),
            total_amount: draft.total_amount(),
            // validate() guarantees presence.
            sale_date: draft.sale_date.ok_or_else(|| {
                DomainError::validation("sale date is required")
            })?,
            user_id,
            created_at: now,
        })
    }
}

impl SaleLine {
    pub fn from_draft(id: SaleLineId, sale_id: SaleId, draft: &SaleLineDraft) -> Self {
        Self {
            id,
            sale_id,
            medicine_id: draft.medicine_id,
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            total_price: draft.line_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: i64, unit_price: Decimal) -> SaleLineDraft {
        SaleLineDraft {
            medicine_id: MedicineId::new(),
            quantity,
            unit_price,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn empty_items_rejected() {
        let draft = SaleDraft {
            customer_name: None,
            sale_date: Some(date()),
            items: vec![],
        };
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn missing_sale_date_rejected() {
        let draft = SaleDraft {
            customer_name: None,
            sale_date: None,
            items: vec![line(1, dec!(2.50))],
        };
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn non_positive_quantity_rejected() {
        for qty in [0, -3] {
            let draft = SaleDraft {
                customer_name: None,
                sale_date: Some(date()),
                items: vec![line(qty, dec!(2.50))],
            };
            assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let draft = SaleDraft {
            customer_name: None,
            sale_date: Some(date()),
            items: vec![line(2, dec!(3.25)), line(3, dec!(1.10))],
        };
        assert_eq!(draft.total_amount(), dec!(9.80));
    }

    #[test]
    fn blank_customer_defaults_to_walk_in() {
        let draft = SaleDraft {
            customer_name: Some("   ".to_string()),
            sale_date: Some(date()),
            items: vec![line(1, dec!(1))],
        };
        assert_eq!(draft.customer(), WALK_IN_CUSTOMER);

        let sale = Sale::from_draft(SaleId::new(), &draft, UserId::new(), Utc::now()).unwrap();
        assert_eq!(sale.customer_name, WALK_IN_CUSTOMER);
        assert_eq!(sale.total_amount, dec!(1));
    }

    #[test]
    fn line_captures_price_at_sale_time() {
        let draft = line(4, dec!(2.75));
        let built = SaleLine::from_draft(SaleLineId::new(), SaleId::new(), &draft);
        assert_eq!(built.unit_price, dec!(2.75));
        assert_eq!(built.total_price, dec!(11.00));
    }
}
