use thiserror::Error;

/// Failures produced by the pipeline itself rather than by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A request type was sent that no handler was registered for.
    /// This is a wiring bug, never a client error.
    #[error("no handler registered for request '{0}'")]
    NoHandler(&'static str),

    #[error("request '{0}' was cancelled")]
    Cancelled(&'static str),
}

/// Rejected registrations, reported by [`MediatorBuilder::build`](crate::MediatorBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediatorError {
    #[error("request '{0}' has more than one handler")]
    DuplicateHandler(&'static str),

    #[error("request '{0}' has more than one validator")]
    DuplicateValidator(&'static str),

    #[error("validator registered for request '{0}' which has no handler")]
    ValidatorWithoutHandler(&'static str),
}
