//! Configuration values for the authentication core
//!
//! Everything here is built once at startup and shared read-only for the
//! lifetime of the process.

use crate::{DoorgateError, Result, ValidationError};
use std::time::Duration;

/// Token validity window: two hours
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Longest token validity the server will accept: 30 days
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Shortest signing secret accepted at startup (HMAC-SHA256 block strength)
pub const MIN_SECRET_LEN: usize = 32;

/// HMAC signing secret. Loaded once, never printed.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DoorgateError::Config("signing secret is missing".to_string()));
        }
        if bytes.len() < MIN_SECRET_LEN {
            return Err(DoorgateError::Config(format!(
                "signing secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                bytes.len()
            )));
        }
        Ok(SigningSecret(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherParams {
    // OWASP baseline for Argon2id
    fn default() -> Self {
        HasherParams {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HasherParams {
    /// Cheapest parameters argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        HasherParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Which characters a username may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsernameCharset {
    /// Any characters, only the length is checked
    #[default]
    Any,
    /// ASCII letters, digits, '_', '-' and '.'
    Word,
}

impl UsernameCharset {
    fn allows(&self, username: &str) -> bool {
        match self {
            UsernameCharset::Any => true,
            UsernameCharset::Word => username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'),
        }
    }
}

/// Registration rules for new accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPolicy {
    pub username_min: usize,
    pub username_max: usize,
    pub password_min: usize,
    pub charset: UsernameCharset,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        CredentialPolicy {
            username_min: 4,
            username_max: 20,
            password_min: 6,
            charset: UsernameCharset::Any,
        }
    }
}

impl CredentialPolicy {
    /// Check already-trimmed credentials. Empty fields are reported first,
    /// then username length, then password length, then the charset.
    pub fn check(&self, username: &str, password: &str) -> std::result::Result<(), ValidationError> {
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::EmptyCredentials);
        }

        let len = username.chars().count();
        if len < self.username_min || len > self.username_max {
            return Err(ValidationError::UsernameLength {
                min: self.username_min,
                max: self.username_max,
            });
        }

        if password.chars().count() < self.password_min {
            return Err(ValidationError::PasswordTooShort { min: self.password_min });
        }

        if !self.charset.allows(username) {
            return Err(ValidationError::UsernameCharset);
        }

        Ok(())
    }
}

/// Settings for the authentication core
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: SigningSecret,
    pub token_ttl: Duration,
    pub hasher: HasherParams,
    pub policy: CredentialPolicy,
}

impl AuthConfig {
    pub fn new(secret: SigningSecret) -> Self {
        AuthConfig {
            secret,
            token_ttl: DEFAULT_TOKEN_TTL,
            hasher: HasherParams::default(),
            policy: CredentialPolicy::default(),
        }
    }
}
