use chrono::{DateTime, Utc};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Dispatched,
    Delivered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Shipment {
    pub fn new(order_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            order_id,
            status: ShipmentStatus::Pending,
            created_at: Utc::now(),
            dispatched_at: None,
            delivered_at: None,
        }
    }

    pub fn dispatch(&mut self) -> ShopResult<()> {
        self.ensure_status(ShipmentStatus::Pending, ShipmentStatus::Dispatched)?;
        self.status = ShipmentStatus::Dispatched;
        self.dispatched_at = Some(Utc::now());
        Ok(())
    }

    pub fn deliver(&mut self) -> ShopResult<()> {
        self.ensure_status(ShipmentStatus::Dispatched, ShipmentStatus::Delivered)?;
        self.status = ShipmentStatus::Delivered;
        self.delivered_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_status(&self, expected: ShipmentStatus, next: ShipmentStatus) -> ShopResult<()> {
        if self.status != expected {
            return Err(ShopError::InvalidTransition {
                entity: "shipment",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }
}
