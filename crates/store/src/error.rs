use thiserror::Error;

use rxstock_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// Deterministic business failures pass through as [`DomainError`];
/// everything infrastructural (connection, transaction, row decoding)
/// collapses into `Database`. Any transaction open at the point of failure
/// has been rolled back by the time the error is returned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether this is the domain-level not-found case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::NotFound))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
