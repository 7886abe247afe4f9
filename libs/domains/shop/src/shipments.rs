//! Shipment lifecycle and the handlers reacting to its events.

use async_trait::async_trait;
use mediator::{CancellationToken, NotificationHandler, Request, RequestHandler};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::context::ShopContext;
use crate::error::{ShopError, ShopResult};
use crate::events::{DomainEvent, ShipmentDelivered, ShipmentDispatched};
use crate::models::{OrderStatus, Shipment};
use crate::store::Change;

#[derive(Debug, Clone)]
pub struct CreateShipment {
    pub order_id: Uuid,
}

impl Request for CreateShipment {
    type Response = Shipment;
    type Error = ShopError;
    const NAME: &'static str = "CreateShipment";
}

#[derive(Debug, Clone)]
pub struct GetShipment {
    pub id: Uuid,
}

impl Request for GetShipment {
    type Response = Shipment;
    type Error = ShopError;
    const NAME: &'static str = "GetShipment";
}

#[derive(Debug, Clone)]
pub struct DispatchShipment {
    pub id: Uuid,
}

impl Request for DispatchShipment {
    type Response = Shipment;
    type Error = ShopError;
    const NAME: &'static str = "DispatchShipment";
}

#[derive(Debug, Clone)]
pub struct DeliverShipment {
    pub id: Uuid,
}

impl Request for DeliverShipment {
    type Response = Shipment;
    type Error = ShopError;
    const NAME: &'static str = "DeliverShipment";
}

#[derive(Clone)]
pub struct ShipmentHandlers {
    context: ShopContext,
}

impl ShipmentHandlers {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<CreateShipment> for ShipmentHandlers {
    #[instrument(skip(self, cancel))]
    async fn handle(&self, request: CreateShipment, cancel: &CancellationToken) -> ShopResult<Shipment> {
        let mut uow = self.context.begin(cancel);
        let order = uow
            .order(request.order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", request.order_id))?;

        if order.status != OrderStatus::Pending {
            return Err(ShopError::InvalidTransition {
                entity: "order",
                from: order.status.to_string(),
                to: OrderStatus::Shipped.to_string(),
            });
        }

        if let Some(existing) = uow.shipment_for_order(order.id).await? {
            return Err(ShopError::ShipmentExists {
                order_id: order.id,
                shipment_id: existing.id,
            });
        }

        let shipment = Shipment::new(order.id);
        uow.stage(Change::InsertShipment(shipment.clone()));
        uow.save_changes().await?;

        info!(shipment_id = %shipment.id, "Created shipment");
        Ok(shipment)
    }
}

#[async_trait]
impl RequestHandler<GetShipment> for ShipmentHandlers {
    async fn handle(&self, request: GetShipment, cancel: &CancellationToken) -> ShopResult<Shipment> {
        self.context
            .begin(cancel)
            .shipment(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("shipment", request.id))
    }
}

#[async_trait]
impl RequestHandler<DispatchShipment> for ShipmentHandlers {
    #[instrument(skip(self, cancel))]
    async fn handle(&self, request: DispatchShipment, cancel: &CancellationToken) -> ShopResult<Shipment> {
        let mut uow = self.context.begin(cancel);
        let mut shipment = uow
            .shipment(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("shipment", request.id))?;
        let mut order = uow
            .order(shipment.order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", shipment.order_id))?;

        shipment.dispatch()?;
        order.mark_shipped()?;

        uow.stage(Change::UpdateShipment(shipment.clone()));
        uow.stage(Change::UpdateOrder(order));
        uow.raise(DomainEvent::ShipmentDispatched(ShipmentDispatched {
            shipment: shipment.clone(),
        }));
        uow.save_changes().await?;

        info!("Dispatched shipment");
        Ok(shipment)
    }
}

#[async_trait]
impl RequestHandler<DeliverShipment> for ShipmentHandlers {
    #[instrument(skip(self, cancel))]
    async fn handle(&self, request: DeliverShipment, cancel: &CancellationToken) -> ShopResult<Shipment> {
        let mut uow = self.context.begin(cancel);
        let mut shipment = uow
            .shipment(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("shipment", request.id))?;

        shipment.deliver()?;

        uow.stage(Change::UpdateShipment(shipment.clone()));
        uow.raise(DomainEvent::ShipmentDelivered(ShipmentDelivered {
            shipment: shipment.clone(),
        }));
        uow.save_changes().await?;

        info!("Delivered shipment");
        Ok(shipment)
    }
}

/// Takes shipped quantities out of stock.
///
/// A missing order fails the invocation. Products deleted since the order
/// was placed are skipped.
#[derive(Clone)]
pub struct DepleteStockOnDispatch {
    context: ShopContext,
}

impl DepleteStockOnDispatch {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl NotificationHandler<ShipmentDispatched> for DepleteStockOnDispatch {
    #[instrument(skip_all, fields(shipment_id = %event.shipment.id))]
    async fn handle(&self, event: &ShipmentDispatched, cancel: &CancellationToken) -> ShopResult<()> {
        let mut uow = self.context.begin(cancel);
        let order_id = event.shipment.order_id;
        let order = uow
            .order(order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", order_id))?;

        let ids: Vec<Uuid> = order.items.iter().map(|item| item.product_id).collect();
        let mut products: HashMap<Uuid, _> = uow
            .products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        for item in &order.items {
            match products.get_mut(&item.product_id) {
                Some(product) => {
                    product.deplete_stock(item.quantity);
                }
                None => debug!(product_id = %item.product_id, "Product no longer exists; skipping"),
            }
        }

        for product in products.into_values() {
            uow.stage(Change::UpdateProduct(product));
        }
        uow.save_changes().await?;

        info!(order_id = %order_id, "Stock updated for dispatched shipment");
        Ok(())
    }
}

/// Marks the order delivered once its shipment arrives.
#[derive(Clone)]
pub struct CompleteOrderOnDelivery {
    context: ShopContext,
}

impl CompleteOrderOnDelivery {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl NotificationHandler<ShipmentDelivered> for CompleteOrderOnDelivery {
    #[instrument(skip_all, fields(shipment_id = %event.shipment.id))]
    async fn handle(&self, event: &ShipmentDelivered, cancel: &CancellationToken) -> ShopResult<()> {
        let mut uow = self.context.begin(cancel);
        let order_id = event.shipment.order_id;
        let mut order = uow
            .order(order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", order_id))?;

        order.mark_delivered()?;
        uow.stage(Change::UpdateOrder(order));
        uow.save_changes().await?;

        info!(order_id = %order_id, "Order delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderItem, Product, ShipmentStatus};
    use crate::orders::{GetOrder, PlaceOrder};
    use crate::products::{CreateProduct, DeleteProduct, GetProductById, UpdateProduct};
    use crate::testing::{TestShop, shop};

    async fn product(shop: &TestShop, stock: i32) -> Product {
        shop.send(CreateProduct {
            name: "Lamp".into(),
            stock,
            price: 4500,
            category_ids: vec![],
        })
        .await
        .unwrap()
    }

    async fn order(shop: &TestShop, lines: &[(Uuid, i32)]) -> Order {
        shop.send(PlaceOrder {
            user_id: Uuid::now_v7(),
            items: lines
                .iter()
                .map(|(product_id, quantity)| OrderItem {
                    product_id: *product_id,
                    quantity: *quantity,
                })
                .collect(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_depletes_stock_through_event() {
        let mut shop = shop();
        let lamp = product(&shop, 5).await;
        let order = order(&shop, &[(lamp.id, 2)]).await;

        let shipment = shop.send(CreateShipment { order_id: order.id }).await.unwrap();
        let dispatched = shop.send(DispatchShipment { id: shipment.id }).await.unwrap();
        assert_eq!(dispatched.status, ShipmentStatus::Dispatched);

        // Stock only changes once the event is handled.
        let before = shop.send(GetProductById { id: lamp.id }).await.unwrap();
        assert_eq!(before.stock, 5);

        assert_eq!(shop.drain_events().await, 1);
        let after = shop.send(GetProductById { id: lamp.id }).await.unwrap();
        assert_eq!(after.stock, 3);

        let order = shop.send(GetOrder { id: order.id }).await.unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_delivery_completes_order() {
        let mut shop = shop();
        let lamp = product(&shop, 5).await;
        let order = order(&shop, &[(lamp.id, 1)]).await;
        let shipment = shop.send(CreateShipment { order_id: order.id }).await.unwrap();

        let early = shop.send(DeliverShipment { id: shipment.id }).await.unwrap_err();
        assert!(matches!(early, ShopError::InvalidTransition { .. }));

        shop.send(DispatchShipment { id: shipment.id }).await.unwrap();
        shop.send(DeliverShipment { id: shipment.id }).await.unwrap();
        assert_eq!(shop.drain_events().await, 2);

        let order = shop.send(GetOrder { id: order.id }).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        let again = shop.send(DispatchShipment { id: shipment.id }).await.unwrap_err();
        assert!(matches!(again, ShopError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_stock_clamps_at_zero_and_deleted_products_are_skipped() {
        let mut shop = shop();
        let lamp = product(&shop, 2).await;
        let chair = product(&shop, 4).await;
        let order = order(&shop, &[(lamp.id, 2), (chair.id, 1)]).await;

        // Sold elsewhere between placement and dispatch.
        shop.send(UpdateProduct {
            id: lamp.id,
            name: lamp.name.clone(),
            stock: 1,
            price: lamp.price,
            category_ids: vec![],
        })
        .await
        .unwrap();
        shop.send(DeleteProduct { id: chair.id }).await.unwrap();

        let shipment = shop.send(CreateShipment { order_id: order.id }).await.unwrap();
        shop.send(DispatchShipment { id: shipment.id }).await.unwrap();
        assert_eq!(shop.drain_events().await, 1);

        let lamp = shop.send(GetProductById { id: lamp.id }).await.unwrap();
        assert_eq!(lamp.stock, 0);
    }

    #[tokio::test]
    async fn test_missing_order_fails_the_event_handler() {
        let shop = shop();
        let orphan = Shipment::new(Uuid::now_v7());

        let result = shop
            .publish(&ShipmentDispatched { shipment: orphan })
            .await;
        assert!(matches!(result, Err(ShopError::NotFound { entity: "order", .. })));
    }

    #[tokio::test]
    async fn test_order_gets_a_single_shipment() {
        let mut shop = shop();
        let lamp = product(&shop, 5).await;
        let order = order(&shop, &[(lamp.id, 1)]).await;

        let first = shop.send(CreateShipment { order_id: order.id }).await.unwrap();
        let second = shop
            .send(CreateShipment { order_id: order.id })
            .await
            .unwrap_err();
        assert!(matches!(
            second,
            ShopError::ShipmentExists { shipment_id, .. } if shipment_id == first.id
        ));

        shop.send(DispatchShipment { id: first.id }).await.unwrap();
        assert_eq!(shop.drain_events().await, 1);
        let lamp = shop.send(GetProductById { id: lamp.id }).await.unwrap();
        assert_eq!(lamp.stock, 4);
    }

    #[tokio::test]
    async fn test_shipment_requires_pending_order() {
        let mut shop = shop();
        let lamp = product(&shop, 5).await;
        let order = order(&shop, &[(lamp.id, 1)]).await;

        let missing = shop
            .send(CreateShipment {
                order_id: Uuid::now_v7(),
            })
            .await
            .unwrap_err();
        assert!(matches!(missing, ShopError::NotFound { entity: "order", .. }));

        let shipment = shop.send(CreateShipment { order_id: order.id }).await.unwrap();
        shop.send(DispatchShipment { id: shipment.id }).await.unwrap();
        shop.drain_events().await;

        let late = shop
            .send(CreateShipment { order_id: order.id })
            .await
            .unwrap_err();
        assert!(matches!(late, ShopError::InvalidTransition { .. }));
    }
}
