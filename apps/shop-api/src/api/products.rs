use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, JsonBody, QueryParams, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_shop::products::{
    CreateProduct, DeleteProduct, GetAllProducts, GetProductById, UpdateProduct,
};
use utoipa::OpenApi;

use super::dto::{ListingParams, ProductRequest, ProductResponse};
use super::{admin_only, location};
use crate::state::AppState;

pub const TAG: &str = "products";

#[derive(OpenApi)]
#[openapi(
    paths(list_products, get_product, create_product, update_product, delete_product),
    components(
        schemas(ProductResponse, ProductRequest, ListingParams),
        responses(
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = TAG, description = "Product catalog"))
)]
pub struct ApiDoc;

pub fn router(state: &AppState) -> Router {
    let public = Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product));

    let admin = admin_only(
        Router::new()
            .route("/", post(create_product))
            .route("/{id}", put(update_product).delete(delete_product)),
        state,
    );

    public.merge(admin).with_state(state.clone())
}

/// List products, sorted and paged
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListingParams),
    responses(
        (status = 200, description = "One page of products", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListingParams>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let request = GetAllProducts {
        listing: params.into(),
    };
    let products = state.mediator.send(request, &state.cancel).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .mediator
        .send(GetProductById { id }, &state.cancel)
        .await?;
    Ok(Json(product.into()))
}

/// Create a product (admin)
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = CreateProduct {
        name: input.name,
        stock: input.stock,
        price: input.price,
        category_ids: input.category_ids,
    };
    let product = state.mediator.send(request, &state.cancel).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location("products", product.id))],
        Json(ProductResponse::from(product)),
    ))
}

/// Replace a product (admin)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
    JsonBody(input): JsonBody<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let request = UpdateProduct {
        id,
        name: input.name,
        stock: input.stock,
        price: input.price,
        category_ids: input.category_ids,
    };
    let product = state.mediator.send(request, &state.cancel).await?;
    Ok(Json(product.into()))
}

/// Delete a product (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    state
        .mediator
        .send(DeleteProduct { id }, &state.cancel)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
