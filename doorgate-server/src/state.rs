//! Process-wide state shared by every request

use doorgate_core::{AuthConfig, AuthGate, AuthService, Result, TokenService};
use doorgate_store::UserStore;
use std::sync::Arc;

use crate::door::Door;

/// Built once at startup and read-only afterwards
pub struct AppState {
    pub auth: AuthService<UserStore>,
    pub gate: AuthGate,
    pub door: Door,
}

impl AppState {
    pub fn new(config: &AuthConfig, users: UserStore) -> Result<Arc<Self>> {
        let tokens = Arc::new(TokenService::new(&config.secret, config.token_ttl));
        Self::with_tokens(config, users, tokens)
    }

    /// Use a specific token service (e.g. one driven by a manual clock)
    pub fn with_tokens(
        config: &AuthConfig,
        users: UserStore,
        tokens: Arc<TokenService>,
    ) -> Result<Arc<Self>> {
        let auth = AuthService::with_tokens(config, users, tokens)?;
        let gate = auth.gate();

        Ok(Arc::new(AppState {
            auth,
            gate,
            door: Door::default(),
        }))
    }
}
