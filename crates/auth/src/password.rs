//! Credential hashing.
//!
//! bcrypt with the library default cost; verification failure and hash
//! corruption both surface as a mismatch so login can answer with one
//! generic message.

use rxstock_core::{DomainError, DomainResult};

/// Hash a cleartext password for storage.
pub fn hash_password(cleartext: &str) -> DomainResult<String> {
    bcrypt::hash(cleartext, bcrypt::DEFAULT_COST)
        .map_err(|e| DomainError::validation(format!("password hashing failed: {e}")))
}

/// Check a cleartext password against a stored hash.
pub fn verify_password(cleartext: &str, hash: &str) -> bool {
    bcrypt::verify(cleartext, hash).unwrap_or(false)
}
