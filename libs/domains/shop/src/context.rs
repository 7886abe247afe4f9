//! Persistence context: one [`UnitOfWork`] per request.
//!
//! Reads go straight to the store. Writes are staged and flushed together
//! by [`UnitOfWork::save_changes`]; nothing is written before that call.
//! Domain events raised on a unit of work are forwarded to the event loop
//! only once the commit has succeeded.

use mediator::CancellationToken;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::events::DomainEvent;
use crate::models::{Category, Order, Product, ProductQuery, Shipment, User};
use crate::store::{Change, Store};

pub type EventSender = mpsc::UnboundedSender<DomainEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<DomainEvent>;

/// Shared handle to the store and the event channel; cheap to clone.
#[derive(Clone)]
pub struct ShopContext {
    store: Arc<dyn Store>,
    events: EventSender,
}

impl ShopContext {
    /// Context over `store`, plus the receiving end of its event channel.
    pub fn new(store: impl Store) -> (Self, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        let context = Self {
            store: Arc::new(store),
            events,
        };
        (context, receiver)
    }

    /// Opens a unit of work bound to `cancel`.
    pub fn begin(&self, cancel: &CancellationToken) -> UnitOfWork {
        UnitOfWork {
            store: Arc::clone(&self.store),
            events: self.events.clone(),
            cancel: cancel.clone(),
            changes: Vec::new(),
            raised: Vec::new(),
        }
    }

    pub async fn ping(&self) -> Result<(), PersistenceError> {
        self.store.ping().await
    }
}

/// Persistence scope and transaction boundary of a single request.
pub struct UnitOfWork {
    store: Arc<dyn Store>,
    events: EventSender,
    cancel: CancellationToken,
    changes: Vec<Change>,
    raised: Vec<DomainEvent>,
}

impl UnitOfWork {
    fn guard(&self) -> Result<(), PersistenceError> {
        if self.cancel.is_cancelled() {
            return Err(PersistenceError::Cancelled);
        }
        Ok(())
    }

    pub async fn category(&self, id: Uuid) -> Result<Option<Category>, PersistenceError> {
        self.guard()?;
        self.store.category_by_id(id).await
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, PersistenceError> {
        self.guard()?;
        self.store.category_by_slug(slug).await
    }

    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>, PersistenceError> {
        self.guard()?;
        self.store
            .category_by_normalized_name(&crate::models::category_key(name))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
        self.guard()?;
        self.store.categories().await
    }

    pub async fn categories_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, PersistenceError> {
        self.guard()?;
        self.store.categories_by_ids(ids).await
    }

    pub async fn product(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        self.guard()?;
        self.store.product_by_id(id).await
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, PersistenceError> {
        self.guard()?;
        self.store.products(query).await
    }

    pub async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, PersistenceError> {
        self.guard()?;
        self.store.products_by_ids(ids).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        self.guard()?;
        self.store
            .user_by_email(&crate::models::email_key(email))
            .await
    }

    pub async fn order(&self, id: Uuid) -> Result<Option<Order>, PersistenceError> {
        self.guard()?;
        self.store.order_by_id(id).await
    }

    pub async fn shipment(&self, id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        self.guard()?;
        self.store.shipment_by_id(id).await
    }

    pub async fn shipment_for_order(&self, order_id: Uuid) -> Result<Option<Shipment>, PersistenceError> {
        self.guard()?;
        self.store.shipment_by_order_id(order_id).await
    }

    /// Stages `change` for the next [`save_changes`](Self::save_changes).
    pub fn stage(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Queues `event` for publication after a successful commit.
    pub fn raise(&mut self, event: DomainEvent) {
        self.raised.push(event);
    }

    /// Commits every staged change atomically, then forwards raised events.
    pub async fn save_changes(self) -> Result<(), PersistenceError> {
        self.guard()?;
        self.store.commit(self.changes).await?;

        for event in self.raised {
            if self.events.send(event).is_err() {
                tracing::warn!("Event loop stopped; dropping domain event");
            }
        }
        Ok(())
    }
}
