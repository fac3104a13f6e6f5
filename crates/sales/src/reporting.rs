//! Time-windowed revenue/transaction statistics.
//!
//! Windows are computed relative to a *reference date*: the most recent
//! recorded sale date, falling back to the wall-clock date when no sales
//! exist. This keeps offline/demo data looking "current" relative to
//! whenever sales were last recorded, and it is deliberate behavior, not an
//! approximation of the real current date.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue and transaction count for one reporting window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    pub revenue: Decimal,
    pub transactions: u64,
}

/// Statistics over the four reporting windows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesStatistics {
    pub today: WindowStats,
    pub week: WindowStats,
    pub month: WindowStats,
    pub all_time: WindowStats,
}

/// The date treated as "today" by reporting: the latest sale date on record,
/// or `fallback` when there are no sales.
pub fn reference_date(
    sale_dates: impl IntoIterator<Item = NaiveDate>,
    fallback: NaiveDate,
) -> NaiveDate {
    sale_dates.into_iter().max().unwrap_or(fallback)
}

fn same_iso_week(a: NaiveDate, b: NaiveDate) -> bool {
    let (wa, wb) = (a.iso_week(), b.iso_week());
    wa.year() == wb.year() && wa.week() == wb.week()
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Aggregate `(sale_date, total_amount)` pairs into the four windows around
/// `reference`.
pub fn statistics(entries: &[(NaiveDate, Decimal)], reference: NaiveDate) -> SalesStatistics {
    let mut stats = SalesStatistics::default();

    let mut add = |window: &mut WindowStats, amount: Decimal| {
        window.revenue += amount;
        window.transactions += 1;
    };

    for &(date, amount) in entries {
        add(&mut stats.all_time, amount);
        if date == reference {
            add(&mut stats.today, amount);
        }
        if same_iso_week(date, reference) {
            add(&mut stats.week, amount);
        }
        if same_month(date, reference) {
            add(&mut stats.month, amount);
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reference_is_latest_sale_date_not_wall_clock() {
        let reference = reference_date(
            [d(2024, 1, 3), d(2024, 1, 10), d(2023, 12, 28)],
            d(2024, 6, 1),
        );
        assert_eq!(reference, d(2024, 1, 10));

        // The "today" window reports 2024-01-10, even though the wall clock
        // says 2024-06-01.
        let entries = vec![
            (d(2024, 1, 10), dec!(40)),
            (d(2024, 1, 10), dec!(15)),
            (d(2024, 1, 3), dec!(100)),
        ];
        let stats = statistics(&entries, reference);
        assert_eq!(stats.today.revenue, dec!(55));
        assert_eq!(stats.today.transactions, 2);
    }

    #[test]
    fn fallback_when_no_sales() {
        assert_eq!(reference_date([], d(2024, 6, 1)), d(2024, 6, 1));
        assert_eq!(statistics(&[], d(2024, 6, 1)), SalesStatistics::default());
    }

    #[test]
    fn iso_week_window_spans_monday_to_sunday() {
        // 2024-01-10 is a Wednesday of ISO week 2; Monday 2024-01-08 and
        // Sunday 2024-01-14 share it, Sunday 2024-01-07 does not.
        let entries = vec![
            (d(2024, 1, 8), dec!(10)),
            (d(2024, 1, 14), dec!(20)),
            (d(2024, 1, 7), dec!(40)),
        ];
        let stats = statistics(&entries, d(2024, 1, 10));
        assert_eq!(stats.week.revenue, dec!(30));
        assert_eq!(stats.week.transactions, 2);
    }

    #[test]
    fn month_window_is_calendar_month() {
        let entries = vec![
            (d(2024, 1, 1), dec!(5)),
            (d(2024, 1, 31), dec!(7)),
            (d(2024, 2, 1), dec!(11)),
            (d(2023, 1, 15), dec!(13)),
        ];
        let stats = statistics(&entries, d(2024, 1, 10));
        assert_eq!(stats.month.revenue, dec!(12));
        assert_eq!(stats.month.transactions, 2);
        assert_eq!(stats.all_time.revenue, dec!(36));
        assert_eq!(stats.all_time.transactions, 4);
    }

    #[test]
    fn iso_week_crossing_year_boundary() {
        // 2024-12-30 and 2025-01-01 are both ISO week 1 of 2025.
        let entries = vec![(d(2024, 12, 30), dec!(10)), (d(2025, 1, 1), dec!(20))];
        let stats = statistics(&entries, d(2025, 1, 1));
        assert_eq!(stats.week.transactions, 2);
        // The calendar-month window does not cross the year boundary.
        assert_eq!(stats.month.transactions, 1);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn narrower_windows_never_exceed_wider_ones(
            offsets in proptest::collection::vec(-400i64..400, 0..40),
            amounts in proptest::collection::vec(0i64..10_000, 0..40),
        ) {
            let reference = d(2024, 6, 15);
            let entries: Vec<(NaiveDate, Decimal)> = offsets
                .iter()
                .zip(&amounts)
                .map(|(&off, &cents)| {
                    (reference + chrono::Duration::days(off), Decimal::new(cents, 2))
                })
                .collect();
            let stats = statistics(&entries, reference);

            // The reference date sits inside its own week and month, so the
            // day window is contained in both, and everything is in all_time.
            prop_assert!(stats.today.transactions <= stats.week.transactions);
            prop_assert!(stats.today.transactions <= stats.month.transactions);
            prop_assert!(stats.week.transactions <= stats.all_time.transactions);
            prop_assert!(stats.month.transactions <= stats.all_time.transactions);
            prop_assert_eq!(stats.all_time.transactions, entries.len() as u64);

            let expected: Decimal = entries.iter().map(|(_, a)| *a).sum();
            prop_assert_eq!(stats.all_time.revenue, expected);
        }
    }
}
