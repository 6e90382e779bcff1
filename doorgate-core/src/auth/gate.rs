//! Access-control decision point for protected actions

use std::sync::Arc;
use tracing::debug;

use crate::auth::TokenService;
use crate::AuthFailure;

const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No credential, or not a bearer credential
    Unauthenticated,
    InvalidOrExpired,
}

impl From<RejectReason> for AuthFailure {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::Unauthenticated => AuthFailure::Unauthenticated,
            RejectReason::InvalidOrExpired => AuthFailure::InvalidOrExpiredToken,
        }
    }
}

/// Outcome of a single authentication attempt. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Authenticated(String),
    Rejected(RejectReason),
}

impl AuthResult {
    /// Authenticated username, or the failure to surface
    pub fn into_result(self) -> std::result::Result<String, AuthFailure> {
        match self {
            AuthResult::Authenticated(username) => Ok(username),
            AuthResult::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// Validates `Authorization: Bearer <token>` credentials
#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        AuthGate { tokens }
    }

    pub fn authenticate(&self, credential_header: Option<&str>) -> AuthResult {
        let Some(token) = credential_header.and_then(|h| h.strip_prefix(BEARER_PREFIX)) else {
            return AuthResult::Rejected(RejectReason::Unauthenticated);
        };

        match self.tokens.validate(token.trim()) {
            Ok(subject) => AuthResult::Authenticated(subject),
            Err(reason) => {
                debug!("Bearer token rejected: {}", reason);
                AuthResult::Rejected(RejectReason::InvalidOrExpired)
            }
        }
    }
}
