//! Registration and sign-in.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use mediator::{CancellationToken, Request, RequestHandler, Validator, rules};
use std::borrow::Cow;
use tracing::{info, instrument, warn};
use validator::ValidationError;

use crate::context::ShopContext;
use crate::error::{PersistenceError, ShopError, ShopResult};
use crate::models::{Role, User};
use crate::store::Change;

pub const MIN_PASSWORD_CHARS: usize = 6;
const MAX_PERSON_NAME_CHARS: usize = 100;

#[derive(Clone)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Request for RegisterUser {
    type Response = User;
    type Error = ShopError;
    const NAME: &'static str = "RegisterUser";
}

/// Upper and lower case letters, a digit and a symbol.
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    let checks = [
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_alphanumeric()),
    ];
    if checks.iter().all(|ok| *ok) {
        return Ok(());
    }
    Err(ValidationError::new("password").with_message(Cow::Borrowed(
        "must contain an uppercase letter, a lowercase letter, a digit and a symbol",
    )))
}

pub fn register_user_validator() -> Validator<RegisterUser> {
    Validator::new()
        .rule("firstName", |r: &RegisterUser| rules::not_blank(&r.first_name))
        .rule("firstName", |r: &RegisterUser| {
            rules::max_chars(r.first_name.trim(), MAX_PERSON_NAME_CHARS)
        })
        .rule("lastName", |r: &RegisterUser| rules::not_blank(&r.last_name))
        .rule("lastName", |r: &RegisterUser| {
            rules::max_chars(r.last_name.trim(), MAX_PERSON_NAME_CHARS)
        })
        .rule("email", |r: &RegisterUser| rules::not_blank(&r.email))
        .rule("email", |r: &RegisterUser| match r.email.trim() {
            "" => Ok(()),
            email => rules::email(email),
        })
        .rule("password", |r: &RegisterUser| rules::not_blank(&r.password))
        .rule("password", |r: &RegisterUser| {
            rules::min_chars(&r.password, MIN_PASSWORD_CHARS)
        })
        .rule("password", |r: &RegisterUser| password_strength(&r.password))
}

#[derive(Clone)]
pub struct AuthenticateUser {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AuthenticateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateUser")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Request for AuthenticateUser {
    type Response = User;
    type Error = ShopError;
    const NAME: &'static str = "AuthenticateUser";
}

pub fn authenticate_user_validator() -> Validator<AuthenticateUser> {
    Validator::new()
        .rule("email", |r: &AuthenticateUser| rules::not_blank(&r.email))
        .rule("password", |r: &AuthenticateUser| rules::not_blank(&r.password))
}

/// Creates the configured administrator unless the email is already taken.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl Request for SeedAdmin {
    /// Whether an account was created.
    type Response = bool;
    type Error = ShopError;
    const NAME: &'static str = "SeedAdmin";
}

pub fn seed_admin_validator() -> Validator<SeedAdmin> {
    Validator::new()
        .rule("email", |r: &SeedAdmin| rules::email(r.email.trim()))
        .rule("password", |r: &SeedAdmin| {
            rules::min_chars(&r.password, MIN_PASSWORD_CHARS)
        })
        .rule("password", |r: &SeedAdmin| password_strength(&r.password))
}

fn hash_password(password: &str) -> ShopResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ShopError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> ShopResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ShopError::Internal(format!("stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct IdentityHandlers {
    context: ShopContext,
}

impl IdentityHandlers {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }

    async fn create_user(
        &self,
        user: User,
        cancel: &CancellationToken,
    ) -> ShopResult<User> {
        let mut uow = self.context.begin(cancel);
        if uow.user_by_email(&user.email).await?.is_some() {
            return Err(ShopError::EmailTaken(user.email));
        }

        uow.stage(Change::InsertUser(user.clone()));
        uow.save_changes().await.map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ShopError::EmailTaken(user.email.clone()),
            other => other.into(),
        })?;
        Ok(user)
    }
}

#[async_trait]
impl RequestHandler<RegisterUser> for IdentityHandlers {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn handle(&self, request: RegisterUser, cancel: &CancellationToken) -> ShopResult<User> {
        let password_hash = hash_password(&request.password)?;
        let user = User::new(
            &request.first_name,
            &request.last_name,
            &request.email,
            password_hash,
            Role::Customer,
        );

        let user = self.create_user(user, cancel).await?;
        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }
}

#[async_trait]
impl RequestHandler<AuthenticateUser> for IdentityHandlers {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn handle(&self, request: AuthenticateUser, cancel: &CancellationToken) -> ShopResult<User> {
        let uow = self.context.begin(cancel);
        let Some(user) = uow.user_by_email(&request.email).await? else {
            info!("Sign-in for unknown email");
            return Err(ShopError::InvalidCredentials);
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(ShopError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[async_trait]
impl RequestHandler<SeedAdmin> for IdentityHandlers {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn handle(&self, request: SeedAdmin, cancel: &CancellationToken) -> ShopResult<bool> {
        if self
            .context
            .begin(cancel)
            .user_by_email(&request.email)
            .await?
            .is_some()
        {
            info!("Administrator account already present");
            return Ok(false);
        }

        let admin = User::new(
            "Shop",
            "Admin",
            &request.email,
            hash_password(&request.password)?,
            Role::Admin,
        );
        let admin = self.create_user(admin, cancel).await?;
        info!(user_id = %admin.id, "Seeded administrator account");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::shop;

    fn registration() -> RegisterUser {
        RegisterUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "Ada@Example.com".into(),
            password: "Abc123!".into(),
        }
    }

    #[test]
    fn test_password_strength() {
        assert!(password_strength("Abc123!").is_ok());
        assert!(password_strength("abc123!").is_err());
        assert!(password_strength("ABC123!").is_err());
        assert!(password_strength("Abcdef!").is_err());
        assert!(password_strength("Abc1234").is_err());
    }

    #[test]
    fn test_each_blank_field_is_reported_alone() {
        let validator = register_user_validator();
        let blank_one: [fn(&mut RegisterUser); 4] = [
            |r| r.first_name.clear(),
            |r| r.last_name.clear(),
            |r| r.email.clear(),
            |r| r.password.clear(),
        ];
        let expected = ["firstName", "lastName", "email", "password"];

        for (blank, field) in blank_one.iter().zip(expected) {
            let mut request = registration();
            blank(&mut request);

            let errors = validator.validate(&request).unwrap_err();
            let fields = errors.field_errors();
            assert_eq!(fields.len(), 1, "only {field} should fail");
            assert!(fields.contains_key(field));
        }
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", registration());
        assert!(!rendered.contains("Abc123!"));
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let shop = shop();
        let user = shop.send(registration()).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Customer);
        assert_ne!(user.password_hash, "Abc123!");

        let signed_in = shop
            .send(AuthenticateUser {
                email: "ADA@example.com".into(),
                password: "Abc123!".into(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.id, user.id);

        let wrong = shop
            .send(AuthenticateUser {
                email: "ada@example.com".into(),
                password: "Wrong123!".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, ShopError::InvalidCredentials));

        let unknown = shop
            .send(AuthenticateUser {
                email: "nobody@example.com".into(),
                password: "Abc123!".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, ShopError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let shop = shop();
        shop.send(registration()).await.unwrap();

        let mut again = registration();
        again.email = "ADA@EXAMPLE.COM".into();
        let err = shop.send(again).await.unwrap_err();
        assert!(matches!(err, ShopError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let shop = shop();
        let seed = SeedAdmin {
            email: "admin@example.com".into(),
            password: "Adm1n!pass".into(),
        };

        assert!(shop.send(seed.clone()).await.unwrap());
        assert!(!shop.send(seed).await.unwrap());

        let admin = shop
            .send(AuthenticateUser {
                email: "admin@example.com".into(),
                password: "Adm1n!pass".into(),
            })
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
