//! cookbook-auth: Credential service for the Cookbook API.
//!
//! Hashes and verifies user passwords with bcrypt, and issues and verifies
//! HS256-signed session tokens. Everything here is CPU-bound; nothing
//! performs I/O.

pub mod config;
pub mod error;
pub mod password;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{HashedCredential, PasswordHasher};
pub use token::{
    issue_token, issue_token_at, verify_token, verify_token_at, Claims, Token, TokenService,
};

/// Password hashing plus token issuance, configured once per process.
#[derive(Debug, Clone)]
pub struct CredentialService {
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl CredentialService {
    pub fn new(hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self { hasher, tokens }
    }

    /// Build from configuration. Fails when the secret is missing or the
    /// bcrypt cost is out of range.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl())?;
        Ok(Self { hasher, tokens })
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
