use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuthUser, JsonBody, JwtClaims, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_shop::orders::{GetOrder, PlaceOrder};
use utoipa::OpenApi;
use uuid::Uuid;

use super::dto::{OrderItemDto, OrderResponse, PlaceOrderRequest};
use super::{authenticated, location};
use crate::state::AppState;

pub const TAG: &str = "orders";

#[derive(OpenApi)]
#[openapi(
    paths(place_order, get_order),
    components(
        schemas(PlaceOrderRequest, OrderItemDto, OrderResponse),
        responses(
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags((name = TAG, description = "Customer orders"))
)]
pub struct ApiDoc;

pub fn router(state: &AppState) -> Router {
    let routes = Router::new()
        .route("/", post(place_order))
        .route("/{id}", get(get_order));

    authenticated(routes, state).with_state(state.clone())
}

fn caller_id(claims: &JwtClaims) -> Result<Uuid, AppError> {
    claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Token subject is not a user".to_string()))
}

/// Place an order for the authenticated user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn place_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    JsonBody(input): JsonBody<PlaceOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = PlaceOrder {
        user_id: caller_id(&claims)?,
        items: input.items.into_iter().map(Into::into).collect(),
    };
    let order = state.mediator.send(request, &state.cancel).await?;

    tracing::info!(order_id = %order.id, user_id = %order.user_id, "Order placed");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location("orders", order.id))],
        Json(OrderResponse::from(order)),
    ))
}

/// Get an order; only its owner or an admin may read it
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.mediator.send(GetOrder { id }, &state.cancel).await?;

    if !claims.is_admin() && claims.user_id() != Some(order.user_id) {
        return Err(AppError::Forbidden(
            "Order belongs to another user".to_string(),
        ));
    }

    Ok(Json(order.into()))
}
