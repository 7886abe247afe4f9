//! Shop Domain
//!
//! Commands, queries and domain events of the shop, dispatched through the
//! [`mediator`] pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Mediator   │  ← validation, routing, cancellation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Handlers   │  ← one per request type, plus event subscribers
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ UnitOfWork  │  ← reads, staged writes, save_changes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Store    │  ← in-memory or Postgres
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_shop::{InMemoryStore, ShopContext, build_mediator, run_event_loop};
//! use mediator::CancellationToken;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (context, events) = ShopContext::new(InMemoryStore::new());
//! let mediator = Arc::new(build_mediator(&context)?);
//! let cancel = CancellationToken::new();
//!
//! tokio::spawn(run_event_loop(mediator.clone(), events, cancel.clone()));
//! # Ok(())
//! # }
//! ```

pub mod categories;
pub mod context;
pub mod error;
pub mod events;
pub mod identity;
pub mod models;
pub mod orders;
pub mod pipeline;
pub mod products;
pub mod shipments;
pub mod store;

pub use context::{EventReceiver, ShopContext, UnitOfWork};
pub use error::{PersistenceError, ShopError, ShopResult};
pub use events::{DomainEvent, dispatch_event, run_event_loop};
pub use pipeline::{build_mediator, verify_wiring};
pub use store::{InMemoryStore, PgStore, Store};

#[cfg(test)]
pub(crate) mod testing {
    use mediator::{CancellationToken, Mediator, Notification, Request};

    use crate::{
        EventReceiver, InMemoryStore, ShopContext, ShopError, ShopResult, build_mediator,
        dispatch_event,
    };

    /// Mediator over a fresh in-memory store, with manual event delivery.
    pub(crate) struct TestShop {
        mediator: Mediator,
        events: EventReceiver,
        cancel: CancellationToken,
    }

    impl TestShop {
        pub(crate) async fn send<R>(&self, request: R) -> ShopResult<R::Response>
        where
            R: Request<Error = ShopError>,
        {
            self.mediator.send(request, &self.cancel).await
        }

        pub(crate) async fn publish<N>(&self, notification: &N) -> ShopResult<()>
        where
            N: Notification<Error = ShopError>,
        {
            self.mediator.publish(notification, &self.cancel).await
        }

        /// Publishes every queued event; returns how many there were.
        pub(crate) async fn drain_events(&mut self) -> usize {
            let mut delivered = 0;
            while let Ok(event) = self.events.try_recv() {
                dispatch_event(&self.mediator, &event, &self.cancel)
                    .await
                    .unwrap();
                delivered += 1;
            }
            delivered
        }
    }

    pub(crate) fn shop() -> TestShop {
        let (context, events) = ShopContext::new(InMemoryStore::new());
        TestShop {
            mediator: build_mediator(&context).unwrap(),
            events,
            cancel: CancellationToken::new(),
        }
    }
}
