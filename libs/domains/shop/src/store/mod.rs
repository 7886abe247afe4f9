//! Storage backends behind the unit of work.
//!
//! A [`Store`] answers reads directly and applies a batch of staged
//! [`Change`]s atomically in [`Store::commit`].

mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::models::{Category, Order, Product, ProductQuery, Shipment, User};

/// A write staged on a unit of work.
#[derive(Debug, Clone)]
pub enum Change {
    InsertCategory(Category),
    InsertProduct(Product),
    UpdateProduct(Product),
    DeleteProduct(Uuid),
    InsertUser(User),
    InsertOrder(Order),
    UpdateOrder(Order),
    InsertShipment(Shipment),
    UpdateShipment(Shipment),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, PersistenceError>;

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError>;

    /// Looks up by the lowercased name.
    async fn category_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Category>, PersistenceError>;

    /// All categories ordered by name.
    async fn categories(&self) -> Result<Vec<Category>, PersistenceError>;

    /// Categories whose id is in `ids`; unknown ids are simply absent.
    async fn categories_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, PersistenceError>;

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError>;

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, PersistenceError>;

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, PersistenceError>;

    /// Looks up by the lowercased email.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError>;

    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>, PersistenceError>;

    async fn shipment_by_id(&self, id: Uuid) -> Result<Option<Shipment>, PersistenceError>;

    /// The shipment of `order_id`; an order has at most one.
    async fn shipment_by_order_id(&self, order_id: Uuid) -> Result<Option<Shipment>, PersistenceError>;

    /// Applies every change or none of them.
    async fn commit(&self, changes: Vec<Change>) -> Result<(), PersistenceError>;

    /// Round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), PersistenceError>;
}
