//! `rxstock-auth` — user accounts, roles and token claims.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines
//! what a user record is, how credentials are hashed and verified, and how
//! bearer-token claims are minted and validated. Transport lives in
//! `rxstock-api`, persistence in `rxstock-store`.

pub mod claims;
pub mod password;
pub mod role;
pub mod user;

pub use claims::{AuthClaims, Hs256TokenCodec, TokenError};
pub use password::{hash_password, verify_password};
pub use role::Role;
pub use user::{ensure_not_self_delete, NewUser, User, UserUpdate};
