//! Domain entities. Status changes go through entity methods so the
//! allowed transitions live in one place.

mod category;
mod order;
mod product;
mod shipment;
mod user;

pub use category::{Category, category_key, slugify};
pub use order::{Order, OrderItem, OrderStatus};
pub use product::{Product, ProductQuery, SortField, SortOrder};
pub use shipment::{Shipment, ShipmentStatus};
pub use user::{Role, User, email_key};
