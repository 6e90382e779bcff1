//! Credential store contract

use crate::{InsertOutcome, Result, UserRecord};

/// Durable username -> password hash mapping.
///
/// Implementations must make `insert_user` atomic with respect to username
/// uniqueness: of two racing inserts for the same name exactly one returns
/// [`InsertOutcome::Inserted`].
pub trait CredentialStore: Send + Sync {
    /// Look up a user by exact username
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Insert a new user unless the username is already taken
    fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        (**self).find_by_username(username)
    }

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        (**self).insert_user(username, password_hash)
    }
}
