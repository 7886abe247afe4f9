//! Product commands and queries.

use async_trait::async_trait;
use mediator::{CancellationToken, Request, RequestHandler, Validator, rules};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::categories::resolve_category;
use crate::context::{ShopContext, UnitOfWork};
use crate::error::{ShopError, ShopResult};
use crate::models::{Category, Product, ProductQuery};
use crate::store::Change;

pub const MAX_NAME_CHARS: usize = 200;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 25;

const SORT_FIELDS: &[&str] = &["name", "price", "date"];
const SORT_ORDERS: &[&str] = &["asc", "desc"];

/// Sorting and paging shared by the product listings.
///
/// Absent values fall back to date order, ascending, page 1 of 10.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl Listing {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn size(&self) -> i64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Only meaningful once validated.
    fn to_query(&self, category_id: Option<Uuid>) -> ProductQuery {
        let mut query = ProductQuery::page(self.page().max(1) as u64, self.size().max(1) as u64);
        query.category_id = category_id;
        query.sort = self
            .sort
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        query.order = self
            .order
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        query
    }
}

fn listing_rules<R: Request>(validator: Validator<R>, listing: fn(&R) -> &Listing) -> Validator<R> {
    validator
        .rule("sort", move |r: &R| {
            rules::one_of_ignore_case(listing(r).sort.as_deref(), SORT_FIELDS)
        })
        .rule("order", move |r: &R| {
            rules::one_of_ignore_case(listing(r).order.as_deref(), SORT_ORDERS)
        })
        .rule("page", move |r: &R| rules::at_least(listing(r).page(), 1))
        .rule("size", move |r: &R| {
            rules::between(listing(r).size(), 1, MAX_PAGE_SIZE)
        })
}

#[derive(Debug, Clone)]
pub struct GetProductById {
    pub id: Uuid,
}

impl Request for GetProductById {
    type Response = Product;
    type Error = ShopError;
    const NAME: &'static str = "GetProductById";
}

#[derive(Debug, Clone, Default)]
pub struct GetAllProducts {
    pub listing: Listing,
}

impl Request for GetAllProducts {
    type Response = Vec<Product>;
    type Error = ShopError;
    const NAME: &'static str = "GetAllProducts";
}

pub fn get_all_products_validator() -> Validator<GetAllProducts> {
    listing_rules(Validator::new(), |r: &GetAllProducts| &r.listing)
}

#[derive(Debug, Clone)]
pub struct GetProductsByCategory {
    pub id_or_slug: String,
    pub listing: Listing,
}

impl Request for GetProductsByCategory {
    type Response = Vec<Product>;
    type Error = ShopError;
    const NAME: &'static str = "GetProductsByCategory";
}

pub fn get_products_by_category_validator() -> Validator<GetProductsByCategory> {
    listing_rules(Validator::new(), |r: &GetProductsByCategory| &r.listing)
}

#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub stock: i32,
    /// Price in cents.
    pub price: i64,
    pub category_ids: Vec<Uuid>,
}

impl Request for CreateProduct {
    type Response = Product;
    type Error = ShopError;
    const NAME: &'static str = "CreateProduct";
}

pub fn create_product_validator() -> Validator<CreateProduct> {
    Validator::new()
        .rule("name", |r: &CreateProduct| rules::not_blank(&r.name))
        .rule("name", |r: &CreateProduct| {
            rules::max_chars(r.name.trim(), MAX_NAME_CHARS)
        })
        .rule("stock", |r: &CreateProduct| rules::at_least(r.stock.into(), 0))
        .rule("price", |r: &CreateProduct| rules::at_least(r.price, 0))
}

#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub price: i64,
    pub category_ids: Vec<Uuid>,
}

impl Request for UpdateProduct {
    type Response = Product;
    type Error = ShopError;
    const NAME: &'static str = "UpdateProduct";
}

pub fn update_product_validator() -> Validator<UpdateProduct> {
    Validator::new()
        .rule("name", |r: &UpdateProduct| rules::not_blank(&r.name))
        .rule("name", |r: &UpdateProduct| {
            rules::max_chars(r.name.trim(), MAX_NAME_CHARS)
        })
        .rule("stock", |r: &UpdateProduct| rules::at_least(r.stock.into(), 0))
        .rule("price", |r: &UpdateProduct| rules::at_least(r.price, 0))
}

#[derive(Debug, Clone)]
pub struct DeleteProduct {
    pub id: Uuid,
}

impl Request for DeleteProduct {
    type Response = ();
    type Error = ShopError;
    const NAME: &'static str = "DeleteProduct";
}

/// Loads the categories in `ids` that exist. Unknown ids are not linked.
async fn load_categories(uow: &UnitOfWork, ids: &[Uuid]) -> ShopResult<Vec<Category>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let categories = uow.categories_by_ids(&ids).await?;
    if categories.len() < ids.len() {
        debug!(
            requested = ids.len(),
            found = categories.len(),
            "Ignoring unknown category ids"
        );
    }
    Ok(categories)
}

/// Handles every product request.
#[derive(Clone)]
pub struct ProductHandlers {
    context: ShopContext,
}

impl ProductHandlers {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<GetProductById> for ProductHandlers {
    async fn handle(&self, request: GetProductById, cancel: &CancellationToken) -> ShopResult<Product> {
        self.context
            .begin(cancel)
            .product(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("product", request.id))
    }
}

#[async_trait]
impl RequestHandler<GetAllProducts> for ProductHandlers {
    async fn handle(
        &self,
        request: GetAllProducts,
        cancel: &CancellationToken,
    ) -> ShopResult<Vec<Product>> {
        let query = request.listing.to_query(None);
        Ok(self.context.begin(cancel).products(&query).await?)
    }
}

#[async_trait]
impl RequestHandler<GetProductsByCategory> for ProductHandlers {
    async fn handle(
        &self,
        request: GetProductsByCategory,
        cancel: &CancellationToken,
    ) -> ShopResult<Vec<Product>> {
        let uow = self.context.begin(cancel);
        let category = resolve_category(&uow, &request.id_or_slug).await?;
        let query = request.listing.to_query(Some(category.id));
        Ok(uow.products(&query).await?)
    }
}

#[async_trait]
impl RequestHandler<CreateProduct> for ProductHandlers {
    #[instrument(skip(self, request, cancel), fields(name = %request.name))]
    async fn handle(&self, request: CreateProduct, cancel: &CancellationToken) -> ShopResult<Product> {
        let mut uow = self.context.begin(cancel);
        let categories = load_categories(&uow, &request.category_ids).await?;

        let product = Product::new(&request.name, request.stock, request.price, categories);
        uow.stage(Change::InsertProduct(product.clone()));
        uow.save_changes().await?;

        info!(product_id = %product.id, "Created product");
        Ok(product)
    }
}

#[async_trait]
impl RequestHandler<UpdateProduct> for ProductHandlers {
    #[instrument(skip(self, request, cancel), fields(product_id = %request.id))]
    async fn handle(&self, request: UpdateProduct, cancel: &CancellationToken) -> ShopResult<Product> {
        let mut uow = self.context.begin(cancel);
        let mut product = uow
            .product(request.id)
            .await?
            .ok_or_else(|| ShopError::not_found("product", request.id))?;
        let categories = load_categories(&uow, &request.category_ids).await?;

        product.update(&request.name, request.stock, request.price, categories);
        uow.stage(Change::UpdateProduct(product.clone()));
        uow.save_changes().await?;

        info!("Updated product");
        Ok(product)
    }
}

#[async_trait]
impl RequestHandler<DeleteProduct> for ProductHandlers {
    #[instrument(skip(self, cancel))]
    async fn handle(&self, request: DeleteProduct, cancel: &CancellationToken) -> ShopResult<()> {
        let mut uow = self.context.begin(cancel);
        if uow.product(request.id).await?.is_none() {
            return Err(ShopError::not_found("product", request.id));
        }

        uow.stage(Change::DeleteProduct(request.id));
        uow.save_changes().await?;

        info!(product_id = %request.id, "Deleted product");
        Ok(())
    }
}
