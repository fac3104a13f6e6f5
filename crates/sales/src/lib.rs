//! `rxstock-sales` — sale records, draft validation and the time-windowed
//! reporting aggregator.
//!
//! The atomic record-and-decrement transaction itself lives in
//! `rxstock-store`; this crate owns the pure pieces: what a valid sale is,
//! what it totals to, and how revenue windows are computed.

pub mod reporting;
pub mod sale;

pub use reporting::{reference_date, statistics, SalesStatistics, WindowStats};
pub use sale::{Sale, SaleDraft, SaleLine, SaleLineDraft, WALK_IN_CUSTOMER};
