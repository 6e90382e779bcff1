//! Error types for doorgate

use thiserror::Error;

/// Input that failed validation before any store or crypto work happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username and password must not be empty")]
    EmptyCredentials,

    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("username may only contain letters, digits, '_', '-' and '.'")]
    UsernameCharset,

    #[error("request body must be JSON")]
    BodyNotJson,

    #[error("invalid parameter, use open=1 or open=2")]
    InvalidDoorParameter,
}

/// Why a request was refused authentication.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("user not authenticated")]
    Unauthenticated,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("invalid username or password")]
    BadCredentials,
}

#[derive(Error, Debug)]
pub enum DoorgateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("username already exists")]
    Conflict { username: String },

    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    Internal,
}

impl DoorgateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DoorgateError::Validation(_) => ErrorKind::Validation,
            DoorgateError::Conflict { .. } => ErrorKind::Conflict,
            DoorgateError::Auth(_) => ErrorKind::Auth,
            _ => ErrorKind::Internal,
        }
    }

    /// Message safe to hand back to a client. Internal details never leak.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}
