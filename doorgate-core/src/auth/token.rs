//! Signed session tokens
//!
//! Tokens are HS256 JWTs carrying `sub`, `iat`, `nbf` and `exp`. Nothing is
//! stored server side: a token is valid while its MAC checks out and the
//! current time is at or before `exp`.

use jwt_simple::prelude::{
    Claims, Clock as JwtClock, Duration as JwtDuration, HS256Key, MACLike, NoCustomClaims,
    VerificationOptions,
};
use jwt_simple::JWTError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{DoorgateError, IssuedToken, Result, SigningSecret};

/// Source of the current Unix time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock. Shares jwt-simple's coarse clock so `iat` is never ahead of
/// the time the signature layer sees.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        JwtClock::now_since_epoch().as_secs()
    }
}

/// Why a token was refused. Kept internal; callers only see a generic rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInvalid {
    /// Tampered, malformed, signed with another key, or missing claims
    Signature,
    Expired,
}

impl std::fmt::Display for TokenInvalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenInvalid::Signature => write!(f, "signature invalid"),
            TokenInvalid::Expired => write!(f, "token expired"),
        }
    }
}

/// Issues and validates bearer tokens with the process signing secret
pub struct TokenService {
    key: HS256Key,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &SigningSecret, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        TokenService {
            key: HS256Key::from_bytes(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject`, valid from now until now + TTL
    pub fn issue(&self, subject: &str) -> Result<IssuedToken> {
        let now = self.clock.now();
        let ttl = self.ttl.as_secs();

        // JWT timestamps are seconds that must fit in 32 bits
        let expires_at = now
            .checked_add(ttl)
            .filter(|&exp| exp <= u64::from(u32::MAX))
            .ok_or_else(|| {
                DoorgateError::Token(format!("expiry out of range: now {} + ttl {}", now, ttl))
            })?;

        let mut claims = Claims::create(JwtDuration::from_secs(ttl)).with_subject(subject);
        claims.issued_at = Some(JwtDuration::from_secs(now));
        claims.invalid_before = Some(JwtDuration::from_secs(now));
        claims.expires_at = Some(JwtDuration::from_secs(expires_at));

        let token = self
            .key
            .authenticate(claims)
            .map_err(|e| DoorgateError::Token(format!("signing failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_in: ttl,
        })
    }

    /// Check the signature, then the expiry. Returns the subject.
    pub fn validate(&self, token: &str) -> std::result::Result<String, TokenInvalid> {
        let options = VerificationOptions {
            time_tolerance: Some(JwtDuration::from_secs(0)),
            ..Default::default()
        };

        let claims = self
            .key
            .verify_token::<NoCustomClaims>(token, Some(options))
            .map_err(|e| match e.downcast_ref::<JWTError>() {
                Some(JWTError::TokenHasExpired) => TokenInvalid::Expired,
                _ => {
                    debug!("Token rejected: {}", e);
                    TokenInvalid::Signature
                }
            })?;

        let (Some(subject), Some(expires_at)) = (claims.subject, claims.expires_at) else {
            return Err(TokenInvalid::Signature);
        };

        if self.clock.now() > expires_at.as_secs() {
            return Err(TokenInvalid::Expired);
        }

        Ok(subject)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
