use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, JsonBody, QueryParams,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_shop::categories::{CreateCategory, GetCategory, ListCategories};
use domain_shop::products::GetProductsByCategory;
use utoipa::OpenApi;

use super::dto::{CategoryResponse, CreateCategoryRequest, ListingParams, ProductResponse};
use super::{admin_only, location};
use crate::state::AppState;

pub const TAG: &str = "categories";

#[derive(OpenApi)]
#[openapi(
    paths(list_categories, get_category, create_category, list_category_products),
    components(
        schemas(CategoryResponse, CreateCategoryRequest),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = TAG, description = "Product categories"))
)]
pub struct ApiDoc;

pub fn router(state: &AppState) -> Router {
    let public = Router::new()
        .route("/", get(list_categories))
        .route("/{id_or_slug}", get(get_category))
        .route("/{id_or_slug}/products", get(list_category_products));

    let admin = admin_only(Router::new().route("/", post(create_category)), state);

    public.merge(admin).with_state(state.clone())
}

/// List all categories ordered by name
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state.mediator.send(ListCategories, &state.cancel).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Get a category by id or slug
#[utoipa::path(
    get,
    path = "/{id_or_slug}",
    tag = TAG,
    params(("id_or_slug" = String, Path, description = "Category UUID or slug")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = state
        .mediator
        .send(GetCategory { id_or_slug }, &state.cancel)
        .await?;
    Ok(Json(category.into()))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .mediator
        .send(CreateCategory { name: input.name }, &state.cancel)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location("categories", category.id))],
        Json(CategoryResponse::from(category)),
    ))
}

/// List the products of one category
#[utoipa::path(
    get,
    path = "/{id_or_slug}/products",
    tag = TAG,
    params(
        ("id_or_slug" = String, Path, description = "Category UUID or slug"),
        ListingParams
    ),
    responses(
        (status = 200, description = "One page of products", body = Vec<ProductResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_category_products(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
    QueryParams(params): QueryParams<ListingParams>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let request = GetProductsByCategory {
        id_or_slug,
        listing: params.into(),
    };
    let products = state.mediator.send(request, &state.cancel).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}
