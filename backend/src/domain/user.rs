//! User accounts and their create/update payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::password::hash_password;
use super::resource::{Resource, ResourceId};
use super::timestamp;
use super::validation::{ValidationErrors, is_valid_email};
use super::Error;

/// Shortest accepted password.
pub const PASSWORD_MIN: usize = 6;

/// Access level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can read and review.
    #[default]
    User,
    /// Can publish bootcamps.
    Publisher,
    /// Can manage users.
    Admin,
}

impl Role {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Publisher => "publisher",
            Self::Admin => "admin",
        }
    }

    /// Resolve a wire name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "publisher" => Some(Self::Publisher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
///
/// The stored form carries the password hash; responses go through
/// [`crate::domain::resource::public_view`], which drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: ResourceId,
    /// Display name.
    pub name: String,
    /// Lower-cased unique e-mail.
    pub email: String,
    /// Access level.
    pub role: Role,
    /// Argon2 PHC hash.
    #[schema(ignore)]
    pub password: String,
    /// Creation time.
    #[serde(with = "timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const HIDDEN_FIELDS: &'static [&'static str] = &["password"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> ResourceId {
        self.id
    }
}

/// Create or update payload for accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInput {
    /// Display name.
    pub name: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
    /// `user`, `publisher`, or `admin`.
    pub role: Option<String>,
    /// Plaintext password; hashed before storage.
    pub password: Option<String>,
}

/// Fields that passed validation. The password is still plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    name: String,
    email: String,
    role: Role,
    password: Option<String>,
}

impl ValidUser {
    /// Validated role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Lower-cased e-mail.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl UserInput {
    /// Check every field, collecting all failures.
    ///
    /// Without `existing` the password is mandatory; with it, stored values
    /// fill every absent field.
    pub fn validate(&self, existing: Option<&User>) -> Result<ValidUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = trimmed(self.name.as_deref())
            .map(str::to_owned)
            .or_else(|| existing.map(|user| user.name.clone()));
        errors.check(name.is_none(), "Please add a name");

        let email = trimmed(self.email.as_deref())
            .map(str::to_lowercase)
            .or_else(|| existing.map(|user| user.email.clone()));
        match &email {
            None => errors.push("Please add an email"),
            Some(email) => errors.check(!is_valid_email(email), "Please add a valid email"),
        }

        let role = match self.role.as_deref().map(str::trim) {
            None => existing.map_or(Role::default(), |user| user.role),
            Some(raw) => Role::parse(raw).unwrap_or_else(|| {
                errors.push(format!("'{raw}' is not a valid role"));
                Role::default()
            }),
        };

        match self.password.as_deref() {
            None if existing.is_none() => errors.push("Please add a password"),
            None => {}
            Some(password) => errors.check(
                password.chars().count() < PASSWORD_MIN,
                "Password must be at least 6 characters",
            ),
        }

        errors.into_result()?;
        Ok(ValidUser {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            role,
            password: self.password.clone(),
        })
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

impl User {
    /// Build a new account, hashing its password.
    pub async fn create(valid: ValidUser) -> Result<Self, Error> {
        let password = hash_password(valid.password.as_deref().unwrap_or_default()).await?;
        Ok(Self {
            id: ResourceId::random(),
            name: valid.name,
            email: valid.email,
            role: valid.role,
            password,
            created_at: timestamp::now(),
        })
    }

    /// Overwrite editable fields, re-hashing a newly supplied password.
    pub async fn apply(&mut self, valid: ValidUser) -> Result<(), Error> {
        if let Some(password) = valid.password.as_deref() {
            self.password = hash_password(password).await?;
        }
        self.name = valid.name;
        self.email = valid.email;
        self.role = valid.role;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::password::verify_password;
    use crate::domain::resource::public_view;
    use rstest::{fixture, rstest};

    #[fixture]
    fn input() -> UserInput {
        UserInput {
            name: Some("Ada Lovelace".into()),
            email: Some("Ada@Example.com".into()),
            role: Some("publisher".into()),
            password: Some("123456".into()),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_lowercases_email_and_hashes_password(input: UserInput) {
        let user = User::create(input.validate(None).expect("valid"))
            .await
            .expect("hashes");

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Publisher);
        assert!(verify_password("123456", &user.password).await);
    }

    #[rstest]
    fn empty_payload_lists_required_fields() {
        let errors = UserInput::default().validate(None).expect_err("invalid");
        assert_eq!(
            errors.to_string(),
            "Please add a name, Please add an email, Please add a password"
        );
    }

    #[rstest]
    #[case(Some("root"), "'root' is not a valid role")]
    #[case(None, "Password must be at least 6 characters")]
    fn field_rules(mut input: UserInput, #[case] role: Option<&str>, #[case] message: &str) {
        if let Some(role) = role {
            input.role = Some(role.into());
        } else {
            input.password = Some("123".into());
        }
        let errors = input.validate(None).expect_err("invalid");
        assert_eq!(errors.to_string(), message);
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_password_unless_supplied(input: UserInput) {
        let mut user = User::create(input.validate(None).expect("valid"))
            .await
            .expect("hashes");
        let original_hash = user.password.clone();
        let patch = UserInput {
            name: Some("Ada King".into()),
            ..UserInput::default()
        };

        user.apply(patch.validate(Some(&user)).expect("valid patch"))
            .await
            .expect("applies");

        assert_eq!(user.name, "Ada King");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.password, original_hash);
    }

    #[rstest]
    #[tokio::test]
    async fn public_view_hides_password(input: UserInput) {
        let user = User::create(input.validate(None).expect("valid"))
            .await
            .expect("hashes");
        let view = public_view(&user).expect("serialises");

        assert!(view.get("password").is_none());
        assert_eq!(view["role"], "publisher");
        assert_eq!(view["name"], "Ada Lovelace");
    }
}
