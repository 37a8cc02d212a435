//! Email address primitive shared by donors, volunteers, and users.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation error returned by [`EmailAddress::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("email address is not valid")]
pub struct InvalidEmail;

/// Syntactically valid, lowercased email address.
///
/// The check is intentionally shallow: exactly one `@`, a non-empty local
/// part, and a dotted domain without whitespace. Deliverability is the mail
/// provider's concern.
///
/// # Examples
/// ```
/// use pazanimal::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Juan@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "juan@example.com");
/// assert!(EmailAddress::new("juan@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, trim, and lowercase an email address.
    ///
    /// # Errors
    /// Returns [`InvalidEmail`] when the value does not look like an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidEmail> {
        let normalized = raw.as_ref().trim().to_lowercase();
        let (local, domain) = normalized.split_once('@').ok_or(InvalidEmail)?;
        let well_formed = !local.is_empty()
            && !domain.contains('@')
            && !normalized.chars().any(char::is_whitespace)
            && domain
                .split('.')
                .all(|label| !label.is_empty())
            && domain.contains('.');
        if well_formed {
            Ok(Self(normalized))
        } else {
            Err(InvalidEmail)
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = InvalidEmail;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("j@x.com")]
    #[case("ana.perez+donaciones@pazanimal.org")]
    #[case("  MIXED@Case.Org  ")]
    fn accepts_plausible_addresses(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("address should validate");
        assert_eq!(email.as_ref(), raw.trim().to_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign.com")]
    #[case("@x.com")]
    #[case("a@b@c.com")]
    #[case("a@localhost")]
    #[case("a@x..com")]
    #[case("a b@x.com")]
    fn rejects_malformed_addresses(#[case] raw: &str) {
        assert_eq!(EmailAddress::new(raw), Err(InvalidEmail));
    }
}
