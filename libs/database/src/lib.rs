//! PostgreSQL connection management for the shop services.
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use core_config::FromEnv;
//!
//! let db = postgres::connect_with_retry(PostgresConfig::from_env()?).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "shop_api").await?;
//! ```

pub mod error;
pub mod postgres;

pub use error::{DatabaseError, DatabaseResult};
