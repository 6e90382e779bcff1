//! Core data types for doorgate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username/password pair as submitted by a client
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Strip surrounding whitespace from both fields
    pub fn trimmed(self) -> Self {
        Credentials {
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }

    /// True when either field is empty
    pub fn has_empty_field(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// PHC-formatted Argon2 hash (algorithm, params, salt and digest)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        UserRecord {
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of an insert against the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Token handed out by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    /// Validity window in seconds
    pub expires_in: u64,
}

/// The two actions the door accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
}

impl DoorAction {
    /// Parse the `open` query value. Only the exact strings "1" and "2" are accepted.
    pub fn from_query_value(value: &str) -> crate::Result<Self> {
        match value {
            "1" => Ok(DoorAction::Open),
            "2" => Ok(DoorAction::Close),
            _ => Err(crate::ValidationError::InvalidDoorParameter.into()),
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            DoorAction::Open => "opened",
            DoorAction::Close => "closed",
        }
    }
}

impl std::fmt::Display for DoorAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoorAction::Open => write!(f, "open"),
            DoorAction::Close => write!(f, "close"),
        }
    }
}
