//! Caller identity for a single request.

use cookbook_auth::{Claims, TokenService};
use cookbook_core::{Access, ApiError, Operation};

const BEARER: &str = "Bearer";

/// Who is calling, as established from the authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Caller {
    /// No header was sent.
    Anonymous,
    /// A valid, unexpired token was presented.
    Authenticated(Claims),
    /// A header was sent but did not hold an acceptable token.
    Rejected(String),
}

/// Per-request context handed to every resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    caller: Caller,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            caller: Caller::Anonymous,
        }
    }

    pub fn authenticated(claims: Claims) -> Self {
        Self {
            caller: Caller::Authenticated(claims),
        }
    }

    /// Build a context from the raw `Authorization` header value.
    ///
    /// Verification failures are recorded rather than returned: a bad token
    /// only matters to operations that require identity.
    pub fn from_authorization_header(header: Option<&str>, tokens: &TokenService) -> Self {
        let Some(raw) = header else {
            return Self::anonymous();
        };

        let token = match raw.trim().split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case(BEARER) && !token.trim().is_empty() => {
                token.trim()
            }
            _ => {
                tracing::debug!("Authorization header is not a bearer token");
                return Self::rejected("Malformed authorization header");
            }
        };

        match tokens.verify(token) {
            Ok(claims) => Self::authenticated(claims),
            Err(e) => Self::rejected(e.to_string()),
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            caller: Caller::Rejected(reason.into()),
        }
    }

    /// Verified claims, if the caller presented a valid token.
    pub fn claims(&self) -> Option<&Claims> {
        match &self.caller {
            Caller::Authenticated(claims) => Some(claims),
            Caller::Anonymous | Caller::Rejected(_) => None,
        }
    }

    /// Check the caller against the operation's access level.
    pub fn authorize(&self, operation: Operation) -> Result<(), ApiError> {
        if operation.access() == Access::Public {
            return Ok(());
        }
        match &self.caller {
            Caller::Authenticated(_) => Ok(()),
            Caller::Anonymous => Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            )),
            Caller::Rejected(reason) => Err(ApiError::Unauthorized(reason.clone())),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
