//! Configuration for the credential service.

use std::time::Duration;

use serde::Deserialize;

/// Credential settings.
///
/// Loaded from the `[auth]` section of `cookbook.toml` or
/// `COOKBOOK__AUTH__*` environment variables.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens. Required.
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
