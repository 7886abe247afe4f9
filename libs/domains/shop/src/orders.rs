//! Order placement and lookup.

use async_trait::async_trait;
use mediator::{CancellationToken, Request, RequestHandler, Validator, rules};
use std::collections::BTreeMap;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::ShopContext;
use crate::error::{ShopError, ShopResult};
use crate::models::{Order, OrderItem};
use crate::store::Change;

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
}

impl Request for PlaceOrder {
    type Response = Order;
    type Error = ShopError;
    const NAME: &'static str = "PlaceOrder";
}

pub fn place_order_validator() -> Validator<PlaceOrder> {
    Validator::new()
        .rule("items", |r: &PlaceOrder| rules::not_empty(&r.items))
        .rule("items", |r: &PlaceOrder| {
            r.items
                .iter()
                .try_for_each(|item| rules::at_least(item.quantity.into(), 1))
        })
}

#[derive(Debug, Clone)]
pub struct GetOrder {
    pub id: Uuid,
}

impl Request for GetOrder {
    type Response = Order;
    type Error = ShopError;
    const NAME: &'static str = "GetOrder";
}

#[derive(Clone)]
pub struct OrderHandlers {
    context: ShopContext,
}

impl OrderHandlers {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<PlaceOrder> for OrderHandlers {
    #[instrument(skip(self, request, cancel), fields(user_id = %request.user_id))]
    async fn handle(&self, request: PlaceOrder, cancel: &CancellationToken) -> ShopResult<Order> {
        let mut uow = self.context.begin(cancel);

        // The same product may appear on several lines.
        let mut wanted: BTreeMap<Uuid, i32> = BTreeMap::new();
        for item in &request.items {
            let total = wanted.entry(item.product_id).or_default();
            *total = total.saturating_add(item.quantity);
        }

        let ids: Vec<Uuid> = wanted.keys().copied().collect();
        let products = uow.products_by_ids(&ids).await?;

        for (product_id, quantity) in &wanted {
            let product = products
                .iter()
                .find(|p| p.id == *product_id)
                .ok_or_else(|| ShopError::not_found("product", product_id))?;
            product.ensure_available(*quantity)?;
        }

        let order = Order::new(request.user_id, request.items);
        uow.stage(Change::InsertOrder(order.clone()));
        uow.save_changes().await?;

        info!(order_id = %order.id, lines = order.items.len(), "Placed order");
        Ok(order)
    }
}

#[async_trait]
impl RequestHandler<GetOrder> for OrderHandlers {
    async fn handle(&self, request: GetOrder, cancel: &CancellationToken) -> ShopResult<Order> {
        self.context
            .begin(cancel)
            .order(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", request.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::CreateProduct;
    use crate::testing::shop;

    #[tokio::test]
    async fn test_place_and_get_order() {
        let shop = shop();
        let lamp = shop
            .send(CreateProduct {
                name: "Lamp".into(),
                stock: 3,
                price: 4500,
                category_ids: vec![],
            })
            .await
            .unwrap();

        let user_id = Uuid::now_v7();
        let order = shop
            .send(PlaceOrder {
                user_id,
                items: vec![OrderItem {
                    product_id: lamp.id,
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        let fetched = shop.send(GetOrder { id: order.id }).await.unwrap();
        assert_eq!(fetched, order);
        assert_eq!(fetched.user_id, user_id);
    }

    #[tokio::test]
    async fn test_quantity_across_lines_must_be_in_stock() {
        let shop = shop();
        let lamp = shop
            .send(CreateProduct {
                name: "Lamp".into(),
                stock: 3,
                price: 4500,
                category_ids: vec![],
            })
            .await
            .unwrap();

        let line = OrderItem {
            product_id: lamp.id,
            quantity: 2,
        };
        let err = shop
            .send(PlaceOrder {
                user_id: Uuid::now_v7(),
                items: vec![line, line],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShopError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_order_rules() {
        let shop = shop();

        let empty = shop
            .send(PlaceOrder {
                user_id: Uuid::now_v7(),
                items: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(empty, ShopError::Validation(_)));

        let zero = shop
            .send(PlaceOrder {
                user_id: Uuid::now_v7(),
                items: vec![OrderItem {
                    product_id: Uuid::now_v7(),
                    quantity: 0,
                }],
            })
            .await
            .unwrap_err();
        assert!(matches!(zero, ShopError::Validation(_)));

        let unknown = shop
            .send(PlaceOrder {
                user_id: Uuid::now_v7(),
                items: vec![OrderItem {
                    product_id: Uuid::now_v7(),
                    quantity: 1,
                }],
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, ShopError::NotFound { entity: "product", .. }));
    }
}
