//! User table over a fjall partition

use doorgate_core::*;
use fjall::{Partition, PartitionCreateOptions};
use std::sync::Arc;
use tracing::debug;

use crate::StorageEngine;

const USERS_PARTITION: &str = "users";

/// fjall-backed [`CredentialStore`]. Records are JSON keyed by username.
#[derive(Clone)]
pub struct UserStore {
    partition: Arc<Partition>,
    engine: StorageEngine,
}

impl UserStore {
    pub(crate) fn new(engine: StorageEngine) -> Result<Self> {
        let partition = Arc::new(
            engine
                .keyspace()
                .open_partition(USERS_PARTITION, PartitionCreateOptions::default())
                .map_err(|e| DoorgateError::Storage(e.to_string()))?,
        );

        Ok(UserStore { partition, engine })
    }

    /// Number of stored users. Scans the partition.
    pub fn count(&self) -> Result<usize> {
        self.partition
            .len()
            .map_err(|e| DoorgateError::Storage(e.to_string()))
    }

    fn get(&self, username: &str) -> Result<Option<UserRecord>> {
        match self.partition.get(username.as_bytes()) {
            Ok(Some(data)) => {
                let record: UserRecord =
                    serde_json::from_slice(&data).map_err(DoorgateError::Serialization)?;
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DoorgateError::Storage(e.to_string())),
        }
    }
}

impl CredentialStore for UserStore {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        self.get(username)
    }

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        // held across every handle on this engine, so a username is claimed once
        let _guard = self
            .engine
            .insert_lock()
            .lock()
            .map_err(|_| DoorgateError::Storage("user insert lock poisoned".to_string()))?;

        if self
            .partition
            .contains_key(username.as_bytes())
            .map_err(|e| DoorgateError::Storage(e.to_string()))?
        {
            debug!("Username already present: {}", username);
            return Ok(InsertOutcome::Duplicate);
        }

        let record = UserRecord::new(username, password_hash);
        let record_json = serde_json::to_vec(&record).map_err(DoorgateError::Serialization)?;

        self.partition
            .insert(username.as_bytes(), record_json)
            .map_err(|e| DoorgateError::Storage(e.to_string()))?;

        self.engine.persist()?;

        Ok(InsertOutcome::Inserted)
    }
}
