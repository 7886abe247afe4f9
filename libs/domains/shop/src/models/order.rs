use chrono::{DateTime, Utc};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: Uuid, items: Vec<OrderItem>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            items,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn mark_shipped(&mut self) -> ShopResult<()> {
        self.transition(OrderStatus::Pending, OrderStatus::Shipped)
    }

    pub fn mark_delivered(&mut self) -> ShopResult<()> {
        self.transition(OrderStatus::Shipped, OrderStatus::Delivered)
    }

    fn transition(&mut self, from: OrderStatus, to: OrderStatus) -> ShopResult<()> {
        if self.status != from {
            return Err(ShopError::InvalidTransition {
                entity: "order",
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}
