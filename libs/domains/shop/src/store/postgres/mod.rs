//! Postgres store built on sea-orm.

pub mod entity;

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

use super::{Change, Store};
use crate::error::PersistenceError;
use crate::models::{
    Category, Order, OrderItem, Product, ProductQuery, Shipment, SortField, SortOrder, User,
};
use entity::{category, order, order_item, product, product_category, shipment, user};

#[derive(Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attaches categories to product rows with two extra queries.
    async fn hydrate(&self, models: Vec<product::Model>) -> Result<Vec<Product>, PersistenceError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = product_category::Entity::find()
            .filter(product_category::Column::ProductId.is_in(product_ids))
            .all(&self.db)
            .await?;

        let mut category_ids: Vec<Uuid> = links.iter().map(|l| l.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, Category::from(m)))
                .collect()
        };

        let mut by_product: HashMap<Uuid, Vec<Category>> = HashMap::new();
        for link in links {
            if let Some(category) = categories.get(&link.category_id) {
                by_product
                    .entry(link.product_id)
                    .or_default()
                    .push(category.clone());
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut categories = by_product.remove(&model.id).unwrap_or_default();
                categories.sort_by(|a, b| a.name.cmp(&b.name));
                product_from_model(model, categories)
            })
            .collect())
    }
}

fn map_db_err(err: DbErr) -> PersistenceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => PersistenceError::UniqueViolation(detail),
        _ => PersistenceError::Database(err),
    }
}

fn parse_column<T: FromStr>(value: &str, column: &str) -> Result<T, PersistenceError> {
    value.parse().map_err(|_| {
        PersistenceError::Database(DbErr::Type(format!(
            "unexpected value '{}' in column {}",
            value, column
        )))
    })
}

impl From<category::Model> for Category {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            created_at: model.created_at.into(),
        }
    }
}

fn product_from_model(model: product::Model, categories: Vec<Category>) -> Product {
    Product {
        id: model.id,
        name: model.name,
        stock: model.stock,
        price: model.price,
        categories,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}

fn product_active_model(product: &Product) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(product.id),
        name: Set(product.name.clone()),
        stock: Set(product.stock),
        price: Set(product.price),
        created_at: Set(product.created_at.into()),
        updated_at: Set(product.updated_at.into()),
    }
}

fn shipment_from_model(model: shipment::Model) -> Result<Shipment, PersistenceError> {
    Ok(Shipment {
        status: parse_column(&model.status, "shipments.status")?,
        id: model.id,
        order_id: model.order_id,
        created_at: model.created_at.into(),
        dispatched_at: model.dispatched_at.map(Into::into),
        delivered_at: model.delivered_at.map(Into::into),
    })
}

fn shipment_active_model(shipment: &Shipment) -> shipment::ActiveModel {
    shipment::ActiveModel {
        id: Set(shipment.id),
        order_id: Set(shipment.order_id),
        status: Set(shipment.status.to_string()),
        created_at: Set(shipment.created_at.into()),
        dispatched_at: Set(shipment.dispatched_at.map(Into::into)),
        delivered_at: Set(shipment.delivered_at.map(Into::into)),
    }
}

async fn link_categories(txn: &DatabaseTransaction, product: &Product) -> Result<(), DbErr> {
    if product.categories.is_empty() {
        return Ok(());
    }

    let links = product.categories.iter().map(|c| product_category::ActiveModel {
        product_id: Set(product.id),
        category_id: Set(c.id),
    });
    product_category::Entity::insert_many(links)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

fn missing_on_not_updated(entity: &'static str, id: Uuid) -> impl FnOnce(DbErr) -> PersistenceError {
    move |err| match err {
        DbErr::RecordNotUpdated => PersistenceError::Missing { entity, id },
        other => map_db_err(other),
    }
}

async fn apply(txn: &DatabaseTransaction, change: Change) -> Result<(), PersistenceError> {
    match change {
        Change::InsertCategory(c) => {
            let model = category::ActiveModel {
                id: Set(c.id),
                normalized_name: Set(c.normalized_name()),
                name: Set(c.name),
                slug: Set(c.slug),
                created_at: Set(c.created_at.into()),
            };
            category::Entity::insert(model)
                .exec_without_returning(txn)
                .await
                .map_err(map_db_err)?;
        }
        Change::InsertProduct(p) => {
            product::Entity::insert(product_active_model(&p))
                .exec_without_returning(txn)
                .await
                .map_err(map_db_err)?;
            link_categories(txn, &p).await.map_err(map_db_err)?;
        }
        Change::UpdateProduct(p) => {
            product::Entity::update(product_active_model(&p))
                .exec(txn)
                .await
                .map_err(missing_on_not_updated("product", p.id))?;
            product_category::Entity::delete_many()
                .filter(product_category::Column::ProductId.eq(p.id))
                .exec(txn)
                .await
                .map_err(map_db_err)?;
            link_categories(txn, &p).await.map_err(map_db_err)?;
        }
        Change::DeleteProduct(id) => {
            let result = product::Entity::delete_by_id(id)
                .exec(txn)
                .await
                .map_err(map_db_err)?;
            if result.rows_affected == 0 {
                return Err(PersistenceError::Missing {
                    entity: "product",
                    id,
                });
            }
        }
        Change::InsertUser(u) => {
            let model = user::ActiveModel {
                id: Set(u.id),
                first_name: Set(u.first_name),
                last_name: Set(u.last_name),
                email: Set(u.email),
                password_hash: Set(u.password_hash),
                role: Set(u.role.to_string()),
                created_at: Set(u.created_at.into()),
            };
            user::Entity::insert(model)
                .exec_without_returning(txn)
                .await
                .map_err(map_db_err)?;
        }
        Change::InsertOrder(o) => {
            let model = order::ActiveModel {
                id: Set(o.id),
                user_id: Set(o.user_id),
                status: Set(o.status.to_string()),
                created_at: Set(o.created_at.into()),
            };
            order::Entity::insert(model)
                .exec_without_returning(txn)
                .await
                .map_err(map_db_err)?;

            if !o.items.is_empty() {
                let items = o
                    .items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| order_item::ActiveModel {
                        order_id: Set(o.id),
                        position: Set(position as i32),
                        product_id: Set(item.product_id),
                        quantity: Set(item.quantity),
                    });
                order_item::Entity::insert_many(items)
                    .exec_without_returning(txn)
                    .await
                    .map_err(map_db_err)?;
            }
        }
        Change::UpdateOrder(o) => {
            let model = order::ActiveModel {
                id: Set(o.id),
                status: Set(o.status.to_string()),
                ..Default::default()
            };
            order::Entity::update(model)
                .exec(txn)
                .await
                .map_err(missing_on_not_updated("order", o.id))?;
        }
        Change::InsertShipment(s) => {
            shipment::Entity::insert(shipment_active_model(&s))
                .exec_without_returning(txn)
                .await
                .map_err(map_db_err)?;
        }
        Change::UpdateShipment(s) => {
            shipment::Entity::update(shipment_active_model(&s))
                .exec(txn)
                .await
                .map_err(missing_on_not_updated("shipment", s.id))?;
        }
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn category_by_id(&self, id: Uuid) -> Result<Option<Category>, PersistenceError> {
        let model = category::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        let model = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn category_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Category>, PersistenceError> {
        let model = category::Entity::find()
            .filter(category::Column::NormalizedName.eq(normalized_name))
            .one(&self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn categories_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = category::Entity::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        let Some(model) = product::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model]).await?.pop())
    }

    #[instrument(skip(self))]
    async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, PersistenceError> {
        let mut select = product::Entity::find();

        if let Some(category_id) = query.category_id {
            let product_ids: Vec<Uuid> = product_category::Entity::find()
                .filter(product_category::Column::CategoryId.eq(category_id))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|link| link.product_id)
                .collect();
            if product_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(product::Column::Id.is_in(product_ids));
        }

        let column = match query.sort {
            SortField::Name => product::Column::Name,
            SortField::Price => product::Column::Price,
            SortField::Date => product::Column::CreatedAt,
        };
        let order = match query.order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        };

        let models = select
            .order_by(column, order.clone())
            .order_by(product::Column::Id, order)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await?;

        self.hydrate(models).await
    }

    #[instrument(skip(self))]
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        self.hydrate(models).await
    }

    #[instrument(skip(self))]
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let Some(model) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(User {
            role: parse_column(&model.role, "users.role")?,
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at.into(),
        }))
    }

    #[instrument(skip(self))]
    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>, PersistenceError> {
        let Some(model) = order::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(id))
            .order_by_asc(order_item::Column::Position)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        Ok(Some(Order {
            status: parse_column(&model.status, "orders.status")?,
            id: model.id,
            user_id: model.user_id,
            items,
            created_at: model.created_at.into(),
        }))
    }

    #[instrument(skip(self))]
    async fn shipment_by_id(&self, id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        shipment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(shipment_from_model)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn shipment_by_order_id(&self, order_id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        shipment::Entity::find()
            .filter(shipment::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await?
            .map(shipment_from_model)
            .transpose()
    }

    #[instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn commit(&self, changes: Vec<Change>) -> Result<(), PersistenceError> {
        if changes.is_empty() {
            return Ok(());
        }

        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await?;
        for change in changes {
            apply(&txn, change).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        self.db.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use test_utils::{TestDataBuilder, TestDatabase};

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_catalog_round_trip() {
        let db = TestDatabase::new().await;
        let store = PgStore::new(db.connection());
        let data = TestDataBuilder::from_test_name("test_catalog_round_trip");

        let category = Category::new(&data.category_name("books"));
        let product = Product::new(&data.product_name("novel"), 4, 1250, vec![category.clone()]);

        store
            .commit(vec![
                Change::InsertCategory(category.clone()),
                Change::InsertProduct(product.clone()),
            ])
            .await
            .unwrap();

        let by_slug = store.category_by_slug(&category.slug).await.unwrap().unwrap();
        assert_eq!(by_slug.id, category.id);

        let mut query = ProductQuery::page(1, 10);
        query.category_id = Some(category.id);
        let products = store.products(&query).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].categories[0].id, category.id);

        let mut updated = products[0].clone();
        updated.update("Renamed", 1, 999, vec![]);
        store
            .commit(vec![Change::UpdateProduct(updated)])
            .await
            .unwrap();
        let reloaded = store.product_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Renamed");
        assert!(reloaded.categories.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_category_is_unique_violation() {
        let db = TestDatabase::new().await;
        let store = PgStore::new(db.connection());

        store
            .commit(vec![Change::InsertCategory(Category::new("Electronics"))])
            .await
            .unwrap();
        let err = store
            .commit(vec![Change::InsertCategory(Category::new("ELECTRONICS"))])
            .await
            .unwrap_err();

        assert!(matches!(err, PersistenceError::UniqueViolation(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_name_that_grows_when_lowercased_is_stored() {
        let db = TestDatabase::new().await;
        let store = PgStore::new(db.connection());

        // "İ" lowercases to two chars, so the key is longer than the name.
        let category = Category::new(&"İ".repeat(100));
        assert!(category.normalized_name().chars().count() > 100);

        store
            .commit(vec![Change::InsertCategory(category.clone())])
            .await
            .unwrap();

        let found = store
            .category_by_normalized_name(&category.normalized_name())
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(category.id));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_order_with_items_and_shipment() {
        let db = TestDatabase::new().await;
        let store = PgStore::new(db.connection());
        let data = TestDataBuilder::from_test_name("test_order_with_items_and_shipment");

        let user = User::new("Ada", "Lovelace", &data.email("ada"), "hash".into(), Role::Customer);
        let product = Product::new("Lamp", 3, 4500, vec![]);
        let order = Order::new(
            user.id,
            vec![OrderItem {
                product_id: product.id,
                quantity: 2,
            }],
        );
        let mut shipment = Shipment::new(order.id);

        store
            .commit(vec![
                Change::InsertUser(user.clone()),
                Change::InsertProduct(product),
                Change::InsertOrder(order.clone()),
                Change::InsertShipment(shipment.clone()),
            ])
            .await
            .unwrap();

        shipment.dispatch().unwrap();
        store
            .commit(vec![Change::UpdateShipment(shipment.clone())])
            .await
            .unwrap();

        let loaded = store.order_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items, order.items);
        let loaded_user = store.user_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(loaded_user.role, Role::Customer);
        let loaded_shipment = store.shipment_by_id(shipment.id).await.unwrap().unwrap();
        assert!(loaded_shipment.dispatched_at.is_some());
        let by_order = store.shipment_by_order_id(order.id).await.unwrap().unwrap();
        assert_eq!(by_order.id, shipment.id);

        let second = store
            .commit(vec![Change::InsertShipment(Shipment::new(order.id))])
            .await
            .unwrap_err();
        assert!(matches!(second, PersistenceError::UniqueViolation(_)));
    }
}
