use crate::{ConfigError, FromEnv, env_or_default};

/// Origins allowed to call the API with credentials.
///
/// Read from `CORS_ALLOWED_ORIGINS` as a comma separated list. An empty list
/// disables cross-origin access entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl FromEnv for CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("CORS_ALLOWED_ORIGINS", "http://localhost:3000");
        let allowed_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                if origin.starts_with("http://") || origin.starts_with("https://") {
                    Ok(origin.trim_end_matches('/').to_string())
                } else {
                    Err(ConfigError::Invalid {
                        key: "CORS_ALLOWED_ORIGINS".to_string(),
                        details: format!("'{origin}' is not an http(s) origin"),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { allowed_origins })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_default_allows_local_frontend() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGINS", || {
            let config = CorsConfig::from_env().unwrap();
            assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        });
    }

    #[test]
    fn test_cors_splits_and_normalizes() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGINS",
            Some("https://shop.example.com/, http://localhost:5173,"),
            || {
                let config = CorsConfig::from_env().unwrap();
                assert_eq!(
                    config.allowed_origins,
                    vec!["https://shop.example.com", "http://localhost:5173"]
                );
            },
        );
    }

    #[test]
    fn test_cors_rejects_bare_hosts() {
        temp_env::with_var("CORS_ALLOWED_ORIGINS", Some("shop.example.com"), || {
            assert!(matches!(
                CorsConfig::from_env(),
                Err(ConfigError::Invalid { .. })
            ));
        });
    }
}
