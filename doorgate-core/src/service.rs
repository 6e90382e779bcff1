//! Registration and login flows

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{AuthGate, PasswordHasher, TokenService};
use crate::{
    AuthConfig, AuthFailure, CredentialPolicy, CredentialStore, Credentials, DoorgateError,
    InsertOutcome, IssuedToken, Result, UserRecord, ValidationError,
};

/// Ties the hasher, the token service and a credential store together.
///
/// All methods are blocking: hashing is deliberately slow, so async callers
/// should run them on a blocking pool.
pub struct AuthService<S> {
    store: S,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    policy: CredentialPolicy,
    // verified against when the username is unknown, so both paths cost one hash
    dummy_hash: String,
}

const DUMMY_PASSWORD: &str = "doorgate-unknown-user";

impl<S: CredentialStore> AuthService<S> {
    pub fn new(config: &AuthConfig, store: S) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(&config.secret, config.token_ttl));
        Self::with_tokens(config, store, tokens)
    }

    /// Build around an existing token service (shared with an [`AuthGate`])
    pub fn with_tokens(config: &AuthConfig, store: S, tokens: Arc<TokenService>) -> Result<Self> {
        let hasher = PasswordHasher::new(config.hasher)?;
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(AuthService {
            store,
            hasher,
            tokens,
            policy: config.policy,
            dummy_hash,
        })
    }

    /// A gate that validates tokens issued by this service
    pub fn gate(&self) -> AuthGate {
        AuthGate::new(self.tokens.clone())
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new account. Returns the stored (trimmed) username.
    pub fn register(&self, credentials: Credentials) -> Result<String> {
        let Credentials { username, password } = credentials.trimmed();
        self.policy.check(&username, &password)?;

        if self.store.find_by_username(&username)?.is_some() {
            debug!("Registration rejected, username taken: {}", username);
            return Err(DoorgateError::Conflict { username });
        }

        let password_hash = self.hasher.hash(&password)?;

        // the store is the final arbiter when two registrations race
        match self.store.insert_user(&username, &password_hash)? {
            InsertOutcome::Inserted => {
                info!("Registered user {}", username);
                Ok(username)
            }
            InsertOutcome::Duplicate => {
                debug!("Registration lost race for username: {}", username);
                Err(DoorgateError::Conflict { username })
            }
        }
    }

    /// Check credentials and issue a token. Unknown users and wrong passwords
    /// produce the same error.
    pub fn login(&self, credentials: Credentials) -> Result<IssuedToken> {
        let credentials = credentials.trimmed();
        if credentials.has_empty_field() {
            return Err(ValidationError::EmptyCredentials.into());
        }
        let Credentials { username, password } = credentials;

        let record = self.store.find_by_username(&username)?;
        let matches = self.hasher.verify(&password, self.digest_for(record.as_ref()));

        if !(matches && record.is_some()) {
            debug!("Login failed for {}", username);
            return Err(AuthFailure::BadCredentials.into());
        }

        let issued = self.tokens.issue(&username)?;
        info!("User {} logged in", username);
        Ok(issued)
    }

    /// Digest a login attempt is checked against. Unknown users get the dummy.
    fn digest_for<'a>(&'a self, record: Option<&'a UserRecord>) -> &'a str {
        record.map_or(self.dummy_hash.as_str(), |r| r.password_hash.as_str())
    }
}
