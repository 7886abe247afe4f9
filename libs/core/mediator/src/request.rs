use crate::{CancellationToken, DispatchError};
use async_trait::async_trait;
use validator::ValidationErrors;

/// A command or query dispatched through the [`Mediator`](crate::Mediator).
pub trait Request: Send + 'static {
    type Response: Send + 'static;

    /// Failure type of the handler. The pipeline builds its own failures
    /// (validation, dispatch) into it.
    type Error: From<ValidationErrors> + From<DispatchError> + Send + 'static;

    /// Stable name used in logs and wiring errors.
    const NAME: &'static str;
}

/// Executes exactly one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    async fn handle(&self, request: R, cancel: &CancellationToken) -> Result<R::Response, R::Error>;
}
