//! Registration, login and session identity.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::password::verify_password;
use super::ports::{DocumentStore, FindQuery};
use super::query::{Condition, FieldPath, Filter};
use super::resource::{Collection, ResourceId, from_document};
use super::user::{Role, User, UserInput};
use super::Error;

/// Login payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account e-mail.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Message returned for any unknown e-mail or wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Authentication use-cases.
#[derive(Clone)]
pub struct AuthService {
    users: Collection<User>,
}

impl AuthService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store),
        }
    }

    /// Self-service sign-up. Only `user` and `publisher` roles may be chosen.
    pub async fn register(&self, input: UserInput) -> Result<User, Error> {
        let valid = input.validate(None)?;
        if valid.role() == Role::Admin {
            return Err(Error::invalid_request("'admin' is not a valid role"));
        }
        let user = User::create(valid).await?;
        self.users.insert(&user).await?;
        info!(id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and return the matching account.
    pub async fn login(&self, request: LoginRequest) -> Result<User, Error> {
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        let password = request.password.as_deref().filter(|password| !password.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(Error::invalid_request("Please provide an email and password"));
        };

        let user = find_by_email(&self.users, &email.to_lowercase()).await?;
        if let Some(user) = user {
            if verify_password(password, &user.password).await {
                return Ok(user);
            }
        }
        warn!("login rejected");
        Err(Error::unauthorized(INVALID_CREDENTIALS))
    }

    /// Resolve the account bound to a session, if it still exists.
    pub async fn current(&self, id: ResourceId) -> Result<Option<User>, Error> {
        self.users.get(id).await
    }
}

/// Look up the account registered under an already lower-cased `email`.
pub(crate) async fn find_by_email(
    users: &Collection<User>,
    email: &str,
) -> Result<Option<User>, Error> {
    let field = FieldPath::parse("email")
        .map_err(|error| Error::internal(format!("email path: {error}")))?;
    let query = FindQuery {
        limit: Some(1),
        ..FindQuery::matching(Filter::all().and(Condition::eq(field, email)))
    };
    users
        .find(&query)
        .await?
        .into_iter()
        .next()
        .map(from_document)
        .transpose()
}
