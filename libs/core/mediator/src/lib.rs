//! In-process request pipeline.
//!
//! A [`Mediator`] routes each request object to the single handler
//! registered for its type, running that type's [`Validator`] first.
//! Notifications fan out to every handler registered for them.
//!
//! Registration is explicit and happens once at startup through
//! [`MediatorBuilder`]; nothing is discovered at runtime.
//!
//! ```ignore
//! let mediator = Mediator::builder()
//!     .handler(CreateCategoryHandler::new(ctx.clone()))
//!     .validator(create_category_rules())
//!     .notification_handler(StockAdjuster::new(ctx))
//!     .build()?;
//!
//! let category = mediator.send(CreateCategory { name }, &cancel).await?;
//! ```

mod cancel;
mod error;
mod mediator;
mod notification;
mod request;
pub mod rules;
mod validation;

pub use cancel::CancellationToken;
pub use error::{DispatchError, MediatorError};
pub use mediator::{Mediator, MediatorBuilder};
pub use notification::{Notification, NotificationHandler};
pub use request::{Request, RequestHandler};
pub use validation::Validator;
