//! Wire types of the HTTP API. Every field is camelCase on the wire.

use chrono::{DateTime, Utc};
use domain_shop::models::{Category, Order, OrderItem, Product, Shipment, User};
use domain_shop::products::Listing;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(example = "customer")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

/// Missing fields deserialize as empty strings so they are reported by
/// validation alongside every other invalid field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Passw0rd!")]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    #[schema(example = "Electronics")]
    pub name: String,
    #[schema(example = "electronics")]
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCategoryRequest {
    #[schema(example = "Electronics")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    /// Price in cents
    pub price: i64,
    pub categories: Vec<CategoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            stock: product.stock,
            price: product.price,
            categories: product.categories.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Body of product create and update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    #[schema(example = "Mechanical keyboard")]
    pub name: String,
    #[schema(example = 12)]
    pub stock: i32,
    /// Price in cents
    #[schema(example = 8999)]
    pub price: i64,
    pub category_ids: Vec<Uuid>,
}

/// Sorting and paging of product listings.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// `name`, `price` or `date` (default)
    pub sort: Option<String>,
    /// `asc` (default) or `desc`
    pub order: Option<String>,
    /// 1-based page number, default 1
    pub page: Option<i64>,
    /// Page size between 1 and 25, default 10
    pub size: Option<i64>,
}

impl From<ListingParams> for Listing {
    fn from(params: ListingParams) -> Self {
        Listing {
            sort: params.sort,
            order: params.order,
            page: params.page,
            size: params.size,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
}

impl From<OrderItemDto> for OrderItem {
    fn from(item: OrderItemDto) -> Self {
        OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "pending")]
    pub status: String,
    pub items: Vec<OrderItemDto>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    #[schema(example = "dispatched")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<Shipment> for ShipmentResponse {
    fn from(shipment: Shipment) -> Self {
        Self {
            id: shipment.id,
            order_id: shipment.order_id,
            status: shipment.status.to_string(),
            created_at: shipment.created_at,
            dispatched_at: shipment.dispatched_at,
            delivered_at: shipment.delivered_at,
        }
    }
}
