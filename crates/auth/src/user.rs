use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rxstock_core::{DomainError, DomainResult, UserId};

use crate::role::Role;

/// A user account. `password_hash` is a bcrypt hash; cleartext credentials
/// are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Materialize a validated `NewUser` with an already-hashed credential.
    pub fn create(
        id: UserId,
        new: &NewUser,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id,
            full_name: new.full_name.trim().to_string(),
            username: new.username.trim().to_string(),
            email: new.email.trim().to_string(),
            password_hash,
            role: new.role,
            last_login: None,
            created_at: now,
        })
    }

    /// Apply a validated update. The credential only changes when a new hash
    /// is supplied.
    pub fn apply_update(
        &mut self,
        update: &UserUpdate,
        password_hash: Option<String>,
    ) -> DomainResult<()> {
        update.validate()?;
        self.full_name = update.full_name.trim().to_string();
        self.username = update.username.trim().to_string();
        self.email = update.email.trim().to_string();
        self.role = update.role;
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        Ok(())
    }
}

/// Fields required to create an account. `password` is cleartext here and
/// hashed before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        if self.full_name.trim().is_empty()
            || self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(DomainError::validation("all fields are required"));
        }
        Ok(())
    }
}

/// Fields for updating an account. The password only changes when
/// `new_password` is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub new_password: Option<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if self.full_name.trim().is_empty()
            || self.username.trim().is_empty()
            || self.email.trim().is_empty()
        {
            return Err(DomainError::validation("required fields are missing"));
        }
        if let Some(password) = &self.new_password {
            if password.is_empty() {
                return Err(DomainError::validation("new password cannot be empty"));
            }
        }
        Ok(())
    }
}

/// A user may not delete their own account.
pub fn ensure_not_self_delete(actor: UserId, target: UserId) -> DomainResult<()> {
    if actor == target {
        return Err(DomainError::validation(
            "you cannot delete your own account",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_requires_all_fields() {
        let user = NewUser {
            full_name: "Jane Doe".to_string(),
            username: "jane".to_string(),
            email: String::new(),
            password: "secret".to_string(),
            role: Role::Pharmacist,
        };
        assert!(matches!(user.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn self_delete_is_rejected() {
        let id = UserId::new();
        assert!(ensure_not_self_delete(id, id).is_err());
        assert!(ensure_not_self_delete(id, UserId::new()).is_ok());
    }

    #[test]
    fn update_without_password_change_is_valid() {
        let update = UserUpdate {
            full_name: "Jane Doe".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Admin,
            new_password: None,
        };
        assert!(update.validate().is_ok());
    }
}
