use crate::{CancellationToken, DispatchError};
use async_trait::async_trait;

/// Something that happened, published to zero or more handlers.
pub trait Notification: Send + Sync + 'static {
    type Error: From<DispatchError> + Send + 'static;

    const NAME: &'static str;
}

#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    async fn handle(&self, notification: &N, cancel: &CancellationToken) -> Result<(), N::Error>;
}
