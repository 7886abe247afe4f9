use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Role name granting access to catalog and fulfilment management.
pub const ADMIN_ROLE: &str = "admin";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub name: String,       // Display name
    pub roles: Vec<String>, // User roles
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
}

impl JwtClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// The subject as a user id, when it is one.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens. Cheap to clone.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl_seconds: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(ttl_seconds = config.token_ttl_seconds, "JWT auth initialized");
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            }),
            ttl_seconds: config.token_ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Signs a token for the given user, valid for the configured TTL.
    pub fn create_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        roles: &[String],
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(JwtError::Encode)
    }

    /// Verify JWT token signature and expiry, and decode claims
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, JwtError> {
        decode::<JwtClaims>(token, &self.keys.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(JwtError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    #[test]
    fn test_token_round_trip_keeps_roles() {
        let auth = auth();
        let user_id = Uuid::now_v7().to_string();
        let token = auth
            .create_token(&user_id, "ada@example.com", "Ada Lovelace", &["admin".to_string()])
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.is_admin());
        assert!(claims.user_id().is_some());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-too").unwrap());
        let token = other.create_token("u1", "a@b.c", "A", &[]).unwrap();

        assert!(matches!(auth().verify_token(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = JwtConfig::new("this-is-a-valid-secret-with-32-chars!")
            .unwrap()
            .with_ttl(-3600);
        let auth = JwtAuth::new(&config);
        let token = auth.create_token("u1", "a@b.c", "A", &[]).unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_customer_is_not_admin() {
        let token = auth()
            .create_token("u1", "a@b.c", "A", &["customer".to_string()])
            .unwrap();
        assert!(!auth().verify_token(&token).unwrap().is_admin());
    }
}
