//! Shared test utilities for the shop crates
//!
//! - `TestDatabase`: PostgreSQL container with the shop schema migrated (feature: "postgres")
//! - `TestDataBuilder`: deterministic names, emails and ids derived from the test name
//! - `assertions`: small assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let category = builder.category_name("main");
//!     let email = builder.email("buyer");
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Password accepted by the registration rules.
pub const VALID_PASSWORD: &str = "Passw0rd!";

/// Builder for test data with deterministic randomization
///
/// Data derived from the same seed is identical across runs; different
/// test names give different data so tests sharing a store do not collide.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_category");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic id, distinct per `salt`.
    pub fn id(&self, salt: u64) -> Uuid {
        let mixed = self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&mixed.to_le_bytes());
        bytes[8..].copy_from_slice(&self.seed.to_be_bytes());
        Uuid::from_bytes(bytes)
    }

    pub fn user_id(&self) -> Uuid {
        self.id(0)
    }

    /// Generic `test-{prefix}-{seed}-{suffix}` name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("product", "main"), "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Category name unique to this test; stays within the 100 char limit.
    pub fn category_name(&self, suffix: &str) -> String {
        format!("Category {} {}", self.seed % 1_000_000, suffix)
    }

    pub fn product_name(&self, suffix: &str) -> String {
        format!("Product {} {}", self.seed % 1_000_000, suffix)
    }

    /// Email unique to this test and `local`.
    pub fn email(&self, local: &str) -> String {
        format!("{}.{}@example.com", local, self.seed)
    }

    /// First and last name pair for a registration form.
    pub fn person(&self) -> (String, String) {
        const FIRST: [&str; 4] = ["Ada", "Grace", "Linus", "Barbara"];
        const LAST: [&str; 4] = ["Lovelace", "Hopper", "Torvalds", "Liskov"];
        let index = (self.seed % 4) as usize;
        (FIRST[index].to_string(), LAST[(index + 1) % 4].to_string())
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
