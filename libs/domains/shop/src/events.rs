//! Domain events and the background loop that publishes them.

use mediator::{CancellationToken, Mediator, Notification};
use std::sync::Arc;
use tracing::{error, info};

use crate::context::EventReceiver;
use crate::error::{ShopError, ShopResult};
use crate::models::Shipment;

#[derive(Debug, Clone)]
pub struct ShipmentDispatched {
    pub shipment: Shipment,
}

impl Notification for ShipmentDispatched {
    type Error = ShopError;
    const NAME: &'static str = "ShipmentDispatched";
}

#[derive(Debug, Clone)]
pub struct ShipmentDelivered {
    pub shipment: Shipment,
}

impl Notification for ShipmentDelivered {
    type Error = ShopError;
    const NAME: &'static str = "ShipmentDelivered";
}

#[derive(Debug, Clone)]
pub enum DomainEvent {
    ShipmentDispatched(ShipmentDispatched),
    ShipmentDelivered(ShipmentDelivered),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ShipmentDispatched(_) => ShipmentDispatched::NAME,
            DomainEvent::ShipmentDelivered(_) => ShipmentDelivered::NAME,
        }
    }
}

/// Publishes one event to its handlers.
pub async fn dispatch_event(
    mediator: &Mediator,
    event: &DomainEvent,
    cancel: &CancellationToken,
) -> ShopResult<()> {
    match event {
        DomainEvent::ShipmentDispatched(e) => mediator.publish(e, cancel).await,
        DomainEvent::ShipmentDelivered(e) => mediator.publish(e, cancel).await,
    }
}

/// Publishes committed events until `cancel` fires or every sender is gone.
///
/// A failing handler is logged and the loop moves on to the next event.
pub async fn run_event_loop(
    mediator: Arc<Mediator>,
    mut events: EventReceiver,
    cancel: CancellationToken,
) {
    info!("Domain event loop started");

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        if let Err(e) = dispatch_event(&mediator, &event, &cancel).await {
            error!(event = event.name(), "Domain event handler failed: {}", e);
        }
    }

    info!("Domain event loop stopped");
}
