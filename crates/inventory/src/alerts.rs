//! Stock/expiry alert classification and aggregation.
//!
//! Pure functions over medicine records: no IO, no clock access. The caller
//! supplies `today`, so views can be pinned to a reference date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::medicine::MedicineItem;

/// Items expiring within this many days are flagged as `expiring`.
pub const EXPIRING_WINDOW_DAYS: u64 = 90;

/// Items expiring within this many days escalate to `High` priority and
/// count toward the critical filter.
pub const URGENT_WINDOW_DAYS: u64 = 30;

/// Derived alert category of a medicine. Exactly one applies, evaluated in
/// this order: expired, expiring, low stock, normal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    Expired,
    Expiring,
    LowStock,
    Normal,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Expired => "expired",
            AlertType::Expiring => "expiring",
            AlertType::LowStock => "low-stock",
            AlertType::Normal => "normal",
        }
    }

    /// Label used in inventory listings, where the fourth branch reads
    /// `in-stock` rather than `normal`.
    pub fn inventory_status(&self) -> &'static str {
        match self {
            AlertType::Normal => "in-stock",
            other => other.as_str(),
        }
    }

    /// Human-readable label for activity feeds.
    pub fn display_label(&self) -> &'static str {
        match self {
            AlertType::Expired => "Expired",
            AlertType::Expiring => "Expiring Soon",
            AlertType::LowStock => "Low Stock",
            AlertType::Normal => "In Stock",
        }
    }
}

/// Attention priority derived alongside the alert type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Full classification of one medicine against a reference date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub alert_type: AlertType,
    pub priority: Priority,
    /// Signed day count until expiry; negative means already expired,
    /// `None` means the record tracks no expiry date.
    pub days_to_expiry: Option<i64>,
}

fn expiring_cutoff(today: NaiveDate) -> NaiveDate {
    today + Days::new(EXPIRING_WINDOW_DAYS)
}

fn urgent_cutoff(today: NaiveDate) -> NaiveDate {
    today + Days::new(URGENT_WINDOW_DAYS)
}

/// Classify a medicine's stock level and expiry date.
///
/// Total and deterministic: every `(stock, reorder, expiry, today)` tuple maps
/// to exactly one classification. A missing expiry date is a valid
/// "no expiry tracking" state, not a failure.
pub fn classify(
    stock_quantity: i64,
    reorder_level: i64,
    expiry_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Classification {
    let low_stock = stock_quantity <= reorder_level;

    let alert_type = match expiry_date {
        Some(d) if d < today => AlertType::Expired,
        Some(d) if d <= expiring_cutoff(today) => AlertType::Expiring,
        _ if low_stock => AlertType::LowStock,
        _ => AlertType::Normal,
    };

    let priority = match expiry_date {
        Some(d) if d < today => Priority::Critical,
        Some(d) if d <= urgent_cutoff(today) => Priority::High,
        Some(d) if d <= expiring_cutoff(today) => Priority::Medium,
        _ if low_stock => Priority::Medium,
        _ => Priority::Low,
    };

    Classification {
        alert_type,
        priority,
        days_to_expiry: expiry_date.map(|d| (d - today).num_days()),
    }
}

impl MedicineItem {
    /// Classify this record against `today`.
    pub fn classify(&self, today: NaiveDate) -> Classification {
        classify(self.stock_quantity, self.reorder_level, self.expiry_date, today)
    }
}

/// Selection applied by the alert listing. Each variant carries its own
/// predicate; these are defined independently of [`classify`]'s labels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertFilter {
    All,
    Critical,
    #[serde(rename = "lowstock")]
    LowStock,
    Expiring,
}

impl AlertFilter {
    /// Parse a query-string value; anything unrecognized falls back to `All`.
    pub fn from_query(value: &str) -> Self {
        match value {
            "critical" => AlertFilter::Critical,
            "lowstock" => AlertFilter::LowStock,
            "expiring" => AlertFilter::Expiring,
            _ => AlertFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFilter::All => "all",
            AlertFilter::Critical => "critical",
            AlertFilter::LowStock => "lowstock",
            AlertFilter::Expiring => "expiring",
        }
    }

    /// Whether `item` is selected by this filter.
    pub fn matches(&self, item: &MedicineItem, today: NaiveDate) -> bool {
        let low_stock = item.stock_quantity <= item.reorder_level;
        match self {
            // Expired, or running low while also expiring soon.
            AlertFilter::Critical => match item.expiry_date {
                Some(d) => d < today || (low_stock && d <= urgent_cutoff(today)),
                None => false,
            },
            AlertFilter::LowStock => low_stock,
            // Within the 90-day window and not yet expired.
            AlertFilter::Expiring => item
                .expiry_date
                .is_some_and(|d| d >= today && d <= expiring_cutoff(today)),
            // Anything needing attention: low stock, expiring, or expired.
            AlertFilter::All => {
                low_stock || item.expiry_date.is_some_and(|d| d <= expiring_cutoff(today))
            }
        }
    }
}

/// Urgency bucket used as the primary sort key of the alert listing:
/// expired first, then expiring within 30 days, then low stock, then the rest.
pub fn urgency_rank(item: &MedicineItem, today: NaiveDate) -> u8 {
    match item.expiry_date {
        Some(d) if d < today => 1,
        Some(d) if d <= urgent_cutoff(today) => 2,
        _ if item.stock_quantity <= item.reorder_level => 3,
        _ => 4,
    }
}

/// Filter and order medicines for the alert view.
///
/// Ordering: urgency rank, then expiry date ascending (no expiry last), then
/// stock quantity ascending.
pub fn list_alerts(
    mut items: Vec<MedicineItem>,
    filter: AlertFilter,
    today: NaiveDate,
) -> Vec<MedicineItem> {
    items.retain(|item| filter.matches(item, today));
    items.sort_by(|a, b| {
        urgency_rank(a, today)
            .cmp(&urgency_rank(b, today))
            .then_with(|| match (a.expiry_date, b.expiry_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => core::cmp::Ordering::Less,
                (None, Some(_)) => core::cmp::Ordering::Greater,
                (None, None) => core::cmp::Ordering::Equal,
            })
            .then_with(|| a.stock_quantity.cmp(&b.stock_quantity))
    });
    items
}

/// Summary counts over the whole catalog, computed via independent full-set
/// predicates (not derived from a filtered listing).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub critical_alerts: u64,
    pub low_stock_alerts: u64,
    pub expiring_alerts: u64,
    pub total_alerts: u64,
}

/// Compute alert summary counts.
///
/// `total_alerts` always equals the size of `list_alerts(items, All, today)`.
pub fn summarize(items: &[MedicineItem], today: NaiveDate) -> AlertSummary {
    let count = |filter: AlertFilter| {
        items.iter().filter(|i| filter.matches(i, today)).count() as u64
    };
    AlertSummary {
        critical_alerts: count(AlertFilter::Critical),
        low_stock_alerts: count(AlertFilter::LowStock),
        expiring_alerts: count(AlertFilter::Expiring),
        total_alerts: count(AlertFilter::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rxstock_core::MedicineId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ts() -> DateTime<Utc> {
        Utc::now()
    }

    fn item(stock: i64, reorder: i64, expiry: Option<NaiveDate>) -> MedicineItem {
        MedicineItem {
            id: MedicineId::new(),
            name: "test".to_string(),
            generic_name: None,
            brand: None,
            category_id: None,
            dosage: None,
            unit_price: Decimal::ONE,
            stock_quantity: stock,
            reorder_level: reorder,
            batch_number: None,
            expiry_date: expiry,
            supplier: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn days_from_today(n: i64) -> NaiveDate {
        today() + chrono::Duration::days(n)
    }

    #[test]
    fn low_stock_without_expiry_is_medium() {
        // Scenario: stock 5 of reorder level 10, no expiry tracking.
        let c = classify(5, 10, None, today());
        assert_eq!(c.alert_type, AlertType::LowStock);
        assert_eq!(c.priority, Priority::Medium);
        assert_eq!(c.days_to_expiry, None);
    }

    #[test]
    fn expired_yesterday_is_critical() {
        let c = classify(50, 10, Some(days_from_today(-1)), today());
        assert_eq!(c.alert_type, AlertType::Expired);
        assert_eq!(c.priority, Priority::Critical);
        assert_eq!(c.days_to_expiry, Some(-1));
    }

    #[test]
    fn expiry_today_is_expiring_not_expired() {
        let c = classify(50, 10, Some(today()), today());
        assert_eq!(c.alert_type, AlertType::Expiring);
        assert_eq!(c.priority, Priority::High);
        assert_eq!(c.days_to_expiry, Some(0));
    }

    #[test]
    fn window_boundaries() {
        // Day 30 is still High; day 31 drops to Medium.
        assert_eq!(
            classify(50, 10, Some(days_from_today(30)), today()).priority,
            Priority::High
        );
        assert_eq!(
            classify(50, 10, Some(days_from_today(31)), today()).priority,
            Priority::Medium
        );
        // Day 90 is still Expiring; day 91 is out of the window.
        assert_eq!(
            classify(50, 10, Some(days_from_today(90)), today()).alert_type,
            AlertType::Expiring
        );
        assert_eq!(
            classify(50, 10, Some(days_from_today(91)), today()).alert_type,
            AlertType::Normal
        );
    }

    #[test]
    fn expiry_takes_precedence_over_low_stock() {
        let c = classify(0, 10, Some(days_from_today(10)), today());
        assert_eq!(c.alert_type, AlertType::Expiring);
    }

    #[test]
    fn healthy_item_is_normal_in_stock() {
        let c = classify(100, 10, Some(days_from_today(365)), today());
        assert_eq!(c.alert_type, AlertType::Normal);
        assert_eq!(c.priority, Priority::Low);
        assert_eq!(c.alert_type.inventory_status(), "in-stock");
    }

    #[test]
    fn critical_filter_requires_expiry_involvement() {
        // Low stock alone is not critical.
        assert!(!AlertFilter::Critical.matches(&item(2, 10, None), today()));
        // Expired is always critical.
        assert!(AlertFilter::Critical.matches(&item(99, 10, Some(days_from_today(-5))), today()));
        // Low stock + expiring within 30 days is critical.
        assert!(AlertFilter::Critical.matches(&item(2, 10, Some(days_from_today(20))), today()));
        // Low stock + expiring in 60 days is not.
        assert!(!AlertFilter::Critical.matches(&item(2, 10, Some(days_from_today(60))), today()));
    }

    #[test]
    fn expiring_filter_excludes_expired() {
        assert!(!AlertFilter::Expiring.matches(&item(50, 10, Some(days_from_today(-1))), today()));
        assert!(AlertFilter::Expiring.matches(&item(50, 10, Some(days_from_today(90))), today()));
    }

    #[test]
    fn all_filter_includes_expired_items() {
        assert!(AlertFilter::All.matches(&item(50, 10, Some(days_from_today(-30))), today()));
    }

    #[test]
    fn listing_orders_by_urgency_then_expiry_then_stock() {
        let expired = item(50, 10, Some(days_from_today(-2)));
        let urgent = item(50, 10, Some(days_from_today(15)));
        let low_near = item(1, 10, None);
        let low_far = item(8, 10, None);
        let listed = list_alerts(
            vec![low_far.clone(), urgent.clone(), low_near.clone(), expired.clone()],
            AlertFilter::All,
            today(),
        );
        let ids: Vec<_> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![expired.id, urgent.id, low_near.id, low_far.id]);
    }

    #[test]
    fn unknown_query_filter_falls_back_to_all() {
        assert_eq!(AlertFilter::from_query("bogus"), AlertFilter::All);
        assert_eq!(AlertFilter::from_query("lowstock"), AlertFilter::LowStock);
    }

    proptest! {
        /// The engine is total and deterministic over its whole input space.
        #[test]
        fn classify_is_total_and_deterministic(
            stock in -1000i64..1000,
            reorder in 0i64..100,
            expiry_offset in proptest::option::of(-400i64..400),
        ) {
            let expiry = expiry_offset.map(days_from_today);
            let a = classify(stock, reorder, expiry, today());
            let b = classify(stock, reorder, expiry, today());
            prop_assert_eq!(a, b);
            if let (Some(offset), Some(days)) = (expiry_offset, a.days_to_expiry) {
                prop_assert_eq!(days, offset);
            }
        }

        /// `summarize` stays consistent with the `all` filter's listing.
        #[test]
        fn summary_total_matches_all_listing(
            specs in proptest::collection::vec(
                (0i64..50, 0i64..30, proptest::option::of(-200i64..200)),
                0..40,
            ),
        ) {
            let items: Vec<_> = specs
                .into_iter()
                .map(|(stock, reorder, offset)| item(stock, reorder, offset.map(days_from_today)))
                .collect();
            let summary = summarize(&items, today());
            let all = list_alerts(items, AlertFilter::All, today());
            prop_assert_eq!(summary.total_alerts as usize, all.len());
        }
    }
}
