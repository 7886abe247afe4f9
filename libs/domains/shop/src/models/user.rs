use chrono::{DateTime, Utc};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Always lowercase.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email_key(email),
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Role names carried in access tokens.
    pub fn roles(&self) -> Vec<String> {
        vec![self.role.to_string()]
    }
}

pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
