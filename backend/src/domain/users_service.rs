//! Administrative user management.

use std::sync::Arc;

use tracing::{info, warn};

use super::advanced_results::{QueryResultEnvelope, advanced_results};
use super::ports::DocumentStore;
use super::resource::{Collection, Resource, ResourceId};
use super::auth_service::find_by_email;
use super::user::{Role, User, UserInput};
use super::Error;

/// Result of [`UsersService::ensure_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminSeed {
    /// A new administrator was stored.
    Created(User),
    /// An account already uses the e-mail; it was left untouched.
    Existing(User),
}

/// CRUD over user accounts.
#[derive(Clone)]
pub struct UsersService {
    users: Collection<User>,
}

impl UsersService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store),
        }
    }

    /// Listing; passwords never appear.
    pub async fn list(
        &self,
        params: &[(String, String)],
        default_limit: u32,
    ) -> Result<QueryResultEnvelope, Error> {
        advanced_results(params, &self.users, None, default_limit).await
    }

    /// Fetch one account.
    pub async fn get(&self, raw_id: &str) -> Result<User, Error> {
        let id = ResourceId::parse(raw_id)?;
        self.users.require(id).await
    }

    /// Create an account with any role.
    pub async fn create(&self, input: UserInput) -> Result<User, Error> {
        let user = User::create(input.validate(None)?).await?;
        self.users.insert(&user).await?;
        info!(id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// Merge `input` into the stored account, re-hashing a new password.
    pub async fn update(&self, raw_id: &str, input: UserInput) -> Result<User, Error> {
        let id = ResourceId::parse(raw_id)?;
        let mut user = self.users.require(id).await?;
        let valid = input.validate(Some(&user))?;
        user.apply(valid).await?;
        if !self.users.replace(&user).await? {
            return Err(User::not_found(id));
        }
        Ok(user)
    }

    /// Make sure an administrator with `input.email` exists.
    ///
    /// Idempotent: an existing account under that e-mail is returned as-is,
    /// whatever its role, and its password is not reset.
    pub async fn ensure_admin(&self, input: UserInput) -> Result<AdminSeed, Error> {
        let valid = UserInput {
            role: Some(Role::Admin.as_str().to_owned()),
            ..input
        }
        .validate(None)?;
        if let Some(existing) = find_by_email(&self.users, valid.email()).await? {
            if existing.role != Role::Admin {
                warn!(id = %existing.id, role = %existing.role, "bootstrap admin e-mail belongs to a non-admin account");
            }
            return Ok(AdminSeed::Existing(existing));
        }
        let user = User::create(valid).await?;
        self.users.insert(&user).await?;
        info!(id = %user.id, "bootstrap admin created");
        Ok(AdminSeed::Created(user))
    }

    /// Hard delete.
    pub async fn delete(&self, raw_id: &str) -> Result<(), Error> {
        let id = ResourceId::parse(raw_id)?;
        if !self.users.delete(id).await? {
            return Err(User::not_found(id));
        }
        info!(%id, "user deleted");
        Ok(())
    }
}
