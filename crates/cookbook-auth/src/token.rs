//! Signed, time-limited session tokens.
//!
//! Tokens use the compact JWS layout `header.payload.signature`, each part
//! base64url-encoded without padding, signed with HMAC-SHA256. Expiry is
//! checked only when a token is verified.

use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use cookbook_core::EntityId;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Identity fields embedded in a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: EntityId,
    pub email: String,
    pub username: String,
}

/// An encoded, signed token.
///
/// Leaves the crate only through `into_string`, when the login payload is
/// built.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    #[serde(flatten)]
    claims: Claims,
    iat: i64,
    exp: i64,
}

/// Issue a token valid for `ttl` from now.
pub fn issue_token(claims: &Claims, secret: &[u8], ttl: Duration) -> Result<Token, AuthError> {
    issue_token_at(claims, secret, ttl, Utc::now())
}

/// Issue a token as if the current time were `now`.
pub fn issue_token_at(
    claims: &Claims,
    secret: &[u8],
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Token, AuthError> {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: TOKEN_TYPE.to_string(),
    };
    let payload = Payload {
        claims: claims.clone(),
        iat: now.timestamp(),
        exp: now.timestamp().saturating_add(ttl_secs),
    };

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?)
    );
    let signature = sign(secret, signing_input.as_bytes())?.finalize().into_bytes();

    Ok(Token(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    )))
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    verify_token_at(token, secret, Utc::now())
}

/// Verify a token as if the current time were `now`.
///
/// Fails closed: nothing from the payload is returned unless the signature
/// matches and the token has not expired.
pub fn verify_token_at(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Claims, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::Malformed);
    };

    let header: Header = decode_json(header_b64)?;
    if header.alg != ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(header.alg));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::Malformed)?;
    let signing_input_len = header_b64.len() + 1 + payload_b64.len();
    sign(secret, token[..signing_input_len].as_bytes())?
        .verify_slice(&signature)
        .map_err(|_| AuthError::BadSignature)?;

    let payload: Payload = decode_json(payload_b64)?;
    if payload.exp <= now.timestamp() {
        return Err(AuthError::Expired);
    }

    Ok(payload.claims)
}

fn sign(secret: &[u8], input: &[u8]) -> Result<HmacSha256, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::MissingSecret)?;
    mac.update(input);
    Ok(mac)
}

fn decode_json<T: serde::de::DeserializeOwned>(part: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}

/// Token issuer/verifier bound to the deployment secret and lifetime.
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self {
            secret: secret.to_vec(),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, claims: &Claims) -> Result<Token, AuthError> {
        issue_token(claims, &self.secret, self.ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        verify_token(token, &self.secret).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            e
        })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
