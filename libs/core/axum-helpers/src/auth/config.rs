//! JWT settings, loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Default lifetime of an issued token, in seconds.
pub const DEFAULT_TOKEN_TTL: i64 = 3600;

/// JWT authentication configuration.
///
/// - `JWT_SECRET` (required): at least 32 characters
/// - `TOKEN_TTL_SECONDS` (optional): defaults to one hour
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    pub token_ttl_seconds: i64,
}

impl JwtConfig {
    /// Builds a config from an explicit secret, typically in tests.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL,
        })
    }

    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < 32 {
        return Err(ConfigError::Invalid {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let token_ttl_seconds = env_parse("TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL)?;
        if token_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_SECONDS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            token_ttl_seconds,
        })
    }
}
