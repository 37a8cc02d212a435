//! Port for password hashing.
//!
//! Hashing is CPU-bound and synchronous; adapters are expected to be cheap
//! to share behind an `Arc`.

use std::fmt;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Encoded password hash, such as an Argon2 PHC string.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded form for storage.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Port for hashing and verifying passwords.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check `password` against `hash`; `Ok(false)` on mismatch.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}

/// Reversible stand-in for tests and database-less runs. Never use it to
/// store real credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

const FIXTURE_PREFIX: &str = "fixture$";

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("{FIXTURE_PREFIX}{password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let stored = hash
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed("missing fixture prefix"))?;
        Ok(stored == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_hasher_verifies_its_own_hashes() {
        let hasher = FixturePasswordHasher;
        let hash = hasher.hash("secreto").expect("hash");
        assert_eq!(hasher.verify("secreto", &hash), Ok(true));
        assert_eq!(hasher.verify("otro", &hash), Ok(false));
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
