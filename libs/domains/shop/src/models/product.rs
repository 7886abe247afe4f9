use chrono::{DateTime, Utc};
use strum::{Display, EnumString};
use tracing::warn;
use uuid::Uuid;

use super::Category;
use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Units on hand, never negative.
    pub stock: i32,
    /// Price in cents.
    pub price: i64,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: &str, stock: i32, price: i64, mut categories: Vec<Category>) -> Self {
        sort_by_name(&mut categories);
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.trim().to_string(),
            stock,
            price,
            categories,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field.
    pub fn update(&mut self, name: &str, stock: i32, price: i64, mut categories: Vec<Category>) {
        sort_by_name(&mut categories);
        self.name = name.trim().to_string();
        self.stock = stock;
        self.price = price;
        self.categories = categories;
        self.updated_at = Utc::now();
    }

    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories.iter().map(|c| c.id).collect()
    }

    /// Fails without touching stock if `quantity` units are not on hand.
    pub fn ensure_available(&self, quantity: i32) -> ShopResult<()> {
        if quantity > self.stock {
            return Err(ShopError::InsufficientStock {
                product_id: self.id,
                requested: quantity,
                available: self.stock,
            });
        }
        Ok(())
    }

    /// Removes shipped units, clamping at zero. Returns the shortfall.
    ///
    /// Stock is not reserved when an order is placed, so by dispatch time
    /// it may have been sold elsewhere.
    pub fn deplete_stock(&mut self, quantity: i32) -> i32 {
        let shortfall = quantity.saturating_sub(self.stock).max(0);
        if shortfall > 0 {
            warn!(
                product_id = %self.id,
                requested = quantity,
                available = self.stock,
                "Shipped more units than in stock; clamping at zero"
            );
        }
        self.stock = self.stock.saturating_sub(quantity).max(0);
        self.updated_at = Utc::now();
        shortfall
    }
}

fn sort_by_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name.cmp(&b.name));
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortField {
    Name,
    Price,
    #[default]
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter, ordering and window for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
    pub sort: SortField,
    pub order: SortOrder,
    pub offset: u64,
    pub limit: u64,
}

impl ProductQuery {
    /// `page` is 1-based. The offset is capped at `i64::MAX`, the largest
    /// value Postgres accepts as `OFFSET`.
    pub fn page(page: u64, size: u64) -> Self {
        Self {
            category_id: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            offset: page
                .saturating_sub(1)
                .saturating_mul(size)
                .min(i64::MAX as u64),
            limit: size,
        }
    }
}
