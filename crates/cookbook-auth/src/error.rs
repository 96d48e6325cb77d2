//! Error types for the cookbook-auth crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token secret is not configured")]
    MissingSecret,

    #[error("Invalid bcrypt cost {0}: must be between 4 and 31")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl AuthError {
    /// True for failures caused by the presented token rather than by local
    /// configuration or hashing.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::Malformed | Self::BadSignature | Self::Expired | Self::UnsupportedAlgorithm(_)
        )
    }
}
