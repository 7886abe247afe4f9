use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Change, Store};
use crate::error::PersistenceError;
use crate::models::{Category, Order, Product, ProductQuery, Shipment, SortField, SortOrder, User};

#[derive(Debug, Default, Clone)]
struct Tables {
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    users: HashMap<Uuid, User>,
    orders: HashMap<Uuid, Order>,
    shipments: HashMap<Uuid, Shipment>,
}

impl Tables {
    fn apply(&mut self, change: Change) -> Result<(), PersistenceError> {
        match change {
            Change::InsertCategory(category) => {
                let normalized = category.normalized_name();
                if self.categories.values().any(|c| {
                    c.normalized_name() == normalized || c.slug == category.slug
                }) {
                    return Err(PersistenceError::UniqueViolation(format!(
                        "category '{}'",
                        category.name
                    )));
                }
                self.categories.insert(category.id, category);
            }
            Change::InsertProduct(product) => {
                self.products.insert(product.id, product);
            }
            Change::UpdateProduct(product) => {
                let slot = self
                    .products
                    .get_mut(&product.id)
                    .ok_or(PersistenceError::Missing {
                        entity: "product",
                        id: product.id,
                    })?;
                *slot = product;
            }
            Change::DeleteProduct(id) => {
                self.products
                    .remove(&id)
                    .ok_or(PersistenceError::Missing {
                        entity: "product",
                        id,
                    })?;
            }
            Change::InsertUser(user) => {
                if self.users.values().any(|u| u.email == user.email) {
                    return Err(PersistenceError::UniqueViolation(format!(
                        "user email '{}'",
                        user.email
                    )));
                }
                self.users.insert(user.id, user);
            }
            Change::InsertOrder(order) => {
                self.orders.insert(order.id, order);
            }
            Change::UpdateOrder(order) => {
                let slot = self
                    .orders
                    .get_mut(&order.id)
                    .ok_or(PersistenceError::Missing {
                        entity: "order",
                        id: order.id,
                    })?;
                *slot = order;
            }
            Change::InsertShipment(shipment) => {
                if self.shipments.values().any(|s| s.order_id == shipment.order_id) {
                    return Err(PersistenceError::UniqueViolation(format!(
                        "shipment for order '{}'",
                        shipment.order_id
                    )));
                }
                self.shipments.insert(shipment.id, shipment);
            }
            Change::UpdateShipment(shipment) => {
                let slot = self
                    .shipments
                    .get_mut(&shipment.id)
                    .ok_or(PersistenceError::Missing {
                        entity: "shipment",
                        id: shipment.id,
                    })?;
                *slot = shipment;
            }
        }
        Ok(())
    }
}

/// Store kept in process memory. Used when no database is configured and
/// by tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_products(a: &Product, b: &Product, sort: SortField) -> Ordering {
    let primary = match sort {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Date => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, PersistenceError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn category_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Category>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.normalized_name() == normalized_name)
            .cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn categories_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.categories.get(id).cloned())
            .collect())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, PersistenceError> {
        let tables = self.tables.read().await;

        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| match query.category_id {
                Some(category_id) => p.categories.iter().any(|c| c.id == category_id),
                None => true,
            })
            .cloned()
            .collect();

        products.sort_by(|a, b| {
            let ordering = compare_products(a, b, query.sort);
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(products
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>, PersistenceError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn shipment_by_id(&self, id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        Ok(self.tables.read().await.shipments.get(&id).cloned())
    }

    async fn shipment_by_order_id(&self, order_id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .shipments
            .values()
            .find(|s| s.order_id == order_id)
            .cloned())
    }

    async fn commit(&self, changes: Vec<Change>) -> Result<(), PersistenceError> {
        let mut tables = self.tables.write().await;

        // Apply to a copy so a failing change leaves nothing behind.
        let mut staged = tables.clone();
        for change in changes {
            staged.apply(change)?;
        }
        *tables = staged;

        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
