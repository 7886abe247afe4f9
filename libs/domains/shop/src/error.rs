use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mediator::DispatchError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Failures raised by a store or unit of work.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A staged update or delete targeted a row that no longer exists.
    #[error("{entity} {id} no longer exists")]
    Missing { entity: &'static str, id: Uuid },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Error kind carried by every failed request.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("category '{0}' already exists")]
    CategoryExists(String),

    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("order {order_id} already has shipment {shipment_id}")]
    ShipmentExists { order_id: Uuid, shipment_id: Uuid },

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ShopResult<T> = Result<T, ShopError>;

impl ShopError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        ShopError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<ShopError> for AppError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::Validation(errors) => AppError::ValidationError(errors),
            ShopError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ShopError::CategoryExists(_)
            | ShopError::EmailTaken(_)
            | ShopError::InsufficientStock { .. }
            | ShopError::ShipmentExists { .. }
            | ShopError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            ShopError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            ShopError::Persistence(PersistenceError::Cancelled)
            | ShopError::Dispatch(DispatchError::Cancelled(_)) => {
                AppError::ServiceUnavailable("Server is shutting down".to_string())
            }
            ShopError::Persistence(PersistenceError::UniqueViolation(_)) => {
                AppError::Conflict("Resource already exists".to_string())
            }
            ShopError::Persistence(PersistenceError::Missing { entity, id }) => {
                AppError::NotFound(format!("{} '{}' not found", entity, id))
            }
            ShopError::Persistence(PersistenceError::Database(e)) => AppError::Database(e),
            ShopError::Dispatch(e) => {
                tracing::error!("Request pipeline misconfigured: {}", e);
                AppError::InternalServerError(e.to_string())
            }
            ShopError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
