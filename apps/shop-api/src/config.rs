use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, cors::CorsConfig, server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Administrator account created at startup when both variables are set.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl AdminSeed {
    /// `ADMIN_EMAIL` and `ADMIN_PASSWORD`; one without the other is an error.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let email = std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty());
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok(Some(Self { email, password })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("ADMIN_PASSWORD".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("ADMIN_EMAIL".to_string())),
        }
    }
}

/// Application configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    /// `None` when `DATABASE_URL` is unset: the in-memory store is used.
    pub database: Option<PostgresConfig>,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(PostgresConfig::from_env()?),
            _ => None,
        };
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 by default
        let jwt = JwtConfig::from_env()?; // Required
        let cors = CorsConfig::from_env()?;
        let admin = AdminSeed::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            jwt,
            cors,
            admin,
        })
    }
}
