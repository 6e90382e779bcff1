//! Credential storage on the fjall keyspace

use doorgate_core::*;
use fjall::{Config, Keyspace, PersistMode};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub mod users;

pub use users::*;

/// Storage engine wrapping a fjall keyspace.
///
/// A data directory belongs to one engine in one process. Clones share the
/// keyspace and the user insert lock.
#[derive(Clone)]
pub struct StorageEngine {
    keyspace: Arc<Keyspace>,
    // serializes check-then-insert across every user table handle
    insert_lock: Arc<Mutex<()>>,
}

impl StorageEngine {
    /// Open (or create) the keyspace at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::new(path);
        let keyspace = Arc::new(
            config
                .open()
                .map_err(|e| DoorgateError::Storage(e.to_string()))?,
        );

        Ok(StorageEngine {
            keyspace,
            insert_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create temporary storage engine for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::tempdir().map_err(|e| DoorgateError::Internal(e.to_string()))?;
        let engine = Self::new(temp_dir.path())?;
        Ok((engine, temp_dir))
    }

    /// Open the user table
    pub fn users(&self) -> Result<UserStore> {
        UserStore::new(self.clone())
    }

    pub(crate) fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub(crate) fn insert_lock(&self) -> &Mutex<()> {
        &self.insert_lock
    }

    /// Flush and fsync everything written so far
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| DoorgateError::Storage(e.to_string()))
    }
}
