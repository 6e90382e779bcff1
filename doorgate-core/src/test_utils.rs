//! Test utilities: an in-memory store, a manual clock and cheap configs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::auth::Clock;
use crate::{
    AuthConfig, CredentialStore, DoorgateError, HasherParams, InsertOutcome, Result,
    SigningSecret, UserRecord,
};

/// Fixed secret shared by tests
pub fn test_secret() -> SigningSecret {
    SigningSecret::new("test-signing-secret-0123456789abcdef").expect("test secret is long enough")
}

/// Default config with the cheapest hashing cost
pub fn test_config() -> AuthConfig {
    let mut config = AuthConfig::new(test_secret());
    config.hasher = HasherParams::insecure_fast();
    config
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        ManualClock {
            now: AtomicU64::new(now),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// HashMap-backed credential store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self
            .users
            .lock()
            .map_err(|e| DoorgateError::Storage(e.to_string()))?;
        Ok(users.get(username).cloned())
    }

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| DoorgateError::Storage(e.to_string()))?;

        if users.contains_key(username) {
            return Ok(InsertOutcome::Duplicate);
        }

        users.insert(username.to_string(), UserRecord::new(username, password_hash));
        Ok(InsertOutcome::Inserted)
    }
}
