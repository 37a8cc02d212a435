//! User data model.
//!
//! Users authenticate with an email and password and hold a set of
//! [`Role`]s. Passwords never live on [`User`]; the hash stays inside the
//! persistence adapter and the [`crate::domain::ports::PasswordHasher`] port.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::auth::Role;
use super::{EmailAddress, UserId};

/// Minimum length of a user name once trimmed.
pub const USER_NAME_MIN: usize = 2;
/// Maximum length of a user name once trimmed.
pub const USER_NAME_MAX: usize = 100;
/// Minimum accepted password length, counted in characters.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The name was blank after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// The name was shorter than [`USER_NAME_MIN`].
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Minimum length.
        min: usize,
    },
    /// The name was longer than [`USER_NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum length.
        max: usize,
    },
    /// The email did not validate.
    #[error("email address is not valid")]
    InvalidEmail,
    /// The password was shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },
}

/// Human-readable user name.
///
/// ## Invariants
/// - Trimmed; between [`USER_NAME_MIN`] and [`USER_NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Errors
    /// Returns [`UserValidationError`] for blank, short, or long names.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let length = trimmed.chars().count();
        if length < USER_NAME_MIN {
            return Err(UserValidationError::NameTooShort {
                min: USER_NAME_MIN,
            });
        }
        if length > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// # Examples
/// ```
/// use pazanimal::domain::{EmailAddress, Role, User, UserId, UserName};
///
/// let user = User::new(
///     UserId::random(),
///     UserName::new("Ana").expect("valid name"),
///     EmailAddress::new("ana@example.org").expect("valid email"),
///     [Role::Usuario],
///     chrono::Utc::now(),
/// );
/// assert!(user.has_role(Role::Usuario));
/// assert!(!user.has_role(Role::Admin));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    roles: BTreeSet<Role>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(
        id: UserId,
        name: UserName,
        email: EmailAddress,
        roles: impl IntoIterator<Item = Role>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            roles: roles.into_iter().collect(),
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Roles granted to the user.
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Whether the user holds `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated request to create a user account.
///
/// Self-service registration always grants [`Role::Usuario`]; administrators
/// may supply an explicit role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
    roles: BTreeSet<Role>,
}

impl NewUser {
    /// Validate raw registration inputs.
    ///
    /// An empty role set falls back to [`Role::Usuario`].
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when any field is invalid.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self, UserValidationError> {
        let name = UserName::new(name)?;
        let email = EmailAddress::new(email).map_err(|_| UserValidationError::InvalidEmail)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let mut roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            roles.insert(Role::Usuario);
        }
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
            roles,
        })
    }

    /// Requested name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Requested login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password, zeroed on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Roles to grant.
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }
}

#[cfg(test)]
mod tests;
