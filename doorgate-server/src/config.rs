//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use doorgate_core::{
    AuthConfig, CredentialPolicy, DoorgateError, HasherParams, Result, SigningSecret,
    UsernameCharset, MAX_TOKEN_TTL,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CharsetArg {
    /// Any characters
    Any,
    /// Letters, digits, '_', '-' and '.'
    Word,
}

impl From<CharsetArg> for UsernameCharset {
    fn from(arg: CharsetArg) -> Self {
        match arg {
            CharsetArg::Any => UsernameCharset::Any,
            CharsetArg::Word => UsernameCharset::Word,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server settings. Every flag can also come from the environment or `.env`.
#[derive(Parser)]
#[command(name = "doorgate-server", version, about = "Token-gated door control service")]
pub struct ServerConfig {
    /// Bind address
    #[arg(long, env = "DOORGATE_BIND", default_value = "0.0.0.0:5001")]
    pub bind: SocketAddr,

    /// Data directory path
    #[arg(long, env = "DOORGATE_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Token signing secret (at least 32 bytes). Required.
    #[arg(long, env = "DOORGATE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Token validity in seconds
    #[arg(long, env = "DOORGATE_TOKEN_TTL_SECS", default_value_t = 7200)]
    pub token_ttl_secs: u64,

    /// Argon2id memory cost in KiB
    #[arg(long, env = "DOORGATE_ARGON2_MEMORY_KIB", default_value_t = HasherParams::default().memory_kib)]
    pub argon2_memory_kib: u32,

    /// Argon2id iterations
    #[arg(long, env = "DOORGATE_ARGON2_ITERATIONS", default_value_t = HasherParams::default().iterations)]
    pub argon2_iterations: u32,

    /// Argon2id lanes
    #[arg(long, env = "DOORGATE_ARGON2_PARALLELISM", default_value_t = HasherParams::default().parallelism)]
    pub argon2_parallelism: u32,

    /// Characters allowed in usernames
    #[arg(long, env = "DOORGATE_USERNAME_CHARSET", value_enum, default_value_t = CharsetArg::Any)]
    pub username_charset: CharsetArg,

    /// Log output format
    #[arg(long, env = "DOORGATE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Build the authentication settings. A missing secret is an error; there is no fallback.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let secret = match self.secret_key.as_deref() {
            Some(secret) if !secret.is_empty() => SigningSecret::new(secret.as_bytes())?,
            _ => {
                return Err(DoorgateError::Config(
                    "DOORGATE_SECRET_KEY is not set".to_string(),
                ))
            }
        };

        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL.as_secs() {
            return Err(DoorgateError::Config(format!(
                "token TTL must be between 1 and {} seconds",
                MAX_TOKEN_TTL.as_secs()
            )));
        }

        Ok(AuthConfig {
            secret,
            token_ttl: Duration::from_secs(self.token_ttl_secs),
            hasher: HasherParams {
                memory_kib: self.argon2_memory_kib,
                iterations: self.argon2_iterations,
                parallelism: self.argon2_parallelism,
            },
            policy: CredentialPolicy {
                charset: self.username_charset.into(),
                ..CredentialPolicy::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["doorgate-server", "--secret-key", SECRET]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:5001".parse().unwrap());

        let auth = config.auth_config().unwrap();
        assert_eq!(auth.token_ttl, Duration::from_secs(7200));
        assert_eq!(auth.hasher, HasherParams::default());
        assert_eq!(auth.policy, CredentialPolicy::default());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let config = ServerConfig::try_parse_from(["doorgate-server"]).unwrap();
        // the variable may be set in the developer's shell
        if config.secret_key.is_none() {
            assert!(matches!(config.auth_config(), Err(DoorgateError::Config(_))));
        }

        let config = ServerConfig::try_parse_from(["doorgate-server", "--secret-key", ""]).unwrap();
        assert!(config.auth_config().is_err());
    }

    #[test]
    fn test_short_secret_is_fatal() {
        let config = ServerConfig::try_parse_from(["doorgate-server", "--secret-key", "short"]).unwrap();
        assert!(matches!(config.auth_config(), Err(DoorgateError::Config(_))));
    }

    #[test]
    fn test_token_ttl_bounds() {
        let with_ttl = |ttl: &str| {
            ServerConfig::try_parse_from(["doorgate-server", "--secret-key", SECRET, "--token-ttl-secs", ttl])
                .unwrap()
                .auth_config()
        };

        assert!(matches!(with_ttl("0"), Err(DoorgateError::Config(_))));
        assert!(matches!(with_ttl("2592001"), Err(DoorgateError::Config(_))));
        assert!(matches!(with_ttl("18446744073709551615"), Err(DoorgateError::Config(_))));
        assert_eq!(with_ttl("2592000").unwrap().token_ttl, MAX_TOKEN_TTL);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "doorgate-server",
            "--secret-key",
            SECRET,
            "--token-ttl-secs",
            "60",
            "--argon2-memory-kib",
            "64",
            "--username-charset",
            "word",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        let auth = config.auth_config().unwrap();
        assert_eq!(auth.token_ttl, Duration::from_secs(60));
        assert_eq!(auth.hasher.memory_kib, 64);
        assert_eq!(auth.policy.charset, UsernameCharset::Word);
    }
}
