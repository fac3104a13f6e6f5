//! `rxstock-store` — persistence boundary.
//!
//! One trait, two backends: [`InMemoryStore`] for tests/dev and
//! [`PostgresStore`] for production. The three multi-step mutations (sale
//! creation, sale deletion, medicine cascade deletion) are all-or-nothing in
//! both backends.

mod error;
mod in_memory;
mod postgres;
mod store;

#[cfg(test)]
mod integration_tests;

pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{CatalogEntry, PharmacyStore, SaleSummary};
