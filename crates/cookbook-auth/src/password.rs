//! bcrypt password hashing.

use std::fmt;

use crate::error::AuthError;

/// A salted bcrypt hash as stored on a User node.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Wrap a hash read back from storage. The value is not validated;
    /// a malformed hash simply never verifies.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedCredential(<redacted>)")
    }
}

/// bcrypt hasher with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(AuthError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<HashedCredential, AuthError> {
        Ok(HashedCredential(bcrypt::hash(password, self.cost)?))
    }

    /// Check a password against a stored hash.
    ///
    /// Any failure, including a hash that cannot be parsed, is `false`.
    pub fn verify(&self, password: &str, hashed: &HashedCredential) -> bool {
        bcrypt::verify(password, hashed.as_str()).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}
