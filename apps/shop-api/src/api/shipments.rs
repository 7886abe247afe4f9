//! Fulfilment endpoints. Every route here is admin-only.
//!
//! Creation lives under the order (`POST /orders/{id}/shipments`) and is
//! mounted from this module so all shipment handlers stay together. The
//! OpenAPI paths are absolute and listed directly in [`crate::openapi::ApiDoc`].

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_shop::shipments::{CreateShipment, DeliverShipment, DispatchShipment, GetShipment};

use super::dto::ShipmentResponse;
use super::{admin_only, location};
use crate::state::AppState;

pub const TAG: &str = "shipments";

/// Routes nested under `/shipments`.
pub fn router(state: &AppState) -> Router {
    let routes = Router::new()
        .route("/{id}", get(get_shipment))
        .route("/{id}/dispatch", post(dispatch_shipment))
        .route("/{id}/deliver", post(deliver_shipment));

    admin_only(routes, state).with_state(state.clone())
}

/// `POST /orders/{id}/shipments`, merged into the orders router.
pub fn order_shipments_router(state: &AppState) -> Router {
    let routes = Router::new().route("/{id}/shipments", post(create_shipment));

    admin_only(routes, state).with_state(state.clone())
}

/// Open a shipment for a pending order (admin)
#[utoipa::path(
    post,
    path = "/orders/{id}/shipments",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 201, description = "Shipment created", body = ShipmentResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn create_shipment(
    State(state): State<AppState>,
    UuidPath(order_id): UuidPath,
) -> Result<impl IntoResponse, AppError> {
    let shipment = state
        .mediator
        .send(CreateShipment { order_id }, &state.cancel)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location("shipments", shipment.id))],
        Json(ShipmentResponse::from(shipment)),
    ))
}

/// Get a shipment (admin)
#[utoipa::path(
    get,
    path = "/shipments/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment found", body = ShipmentResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn get_shipment(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> Result<Json<ShipmentResponse>, AppError> {
    let shipment = state
        .mediator
        .send(GetShipment { id }, &state.cancel)
        .await?;
    Ok(Json(shipment.into()))
}

/// Hand a pending shipment to the carrier (admin)
///
/// Stock of the ordered products is decremented shortly after, in the background.
#[utoipa::path(
    post,
    path = "/shipments/{id}/dispatch",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment dispatched", body = ShipmentResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn dispatch_shipment(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> Result<Json<ShipmentResponse>, AppError> {
    let shipment = state
        .mediator
        .send(DispatchShipment { id }, &state.cancel)
        .await?;
    Ok(Json(shipment.into()))
}

/// Confirm delivery of a dispatched shipment (admin)
#[utoipa::path(
    post,
    path = "/shipments/{id}/deliver",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Shipment ID")),
    responses(
        (status = 200, description = "Shipment delivered", body = ShipmentResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn deliver_shipment(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> Result<Json<ShipmentResponse>, AppError> {
    let shipment = state
        .mediator
        .send(DeliverShipment { id }, &state.cancel)
        .await?;
    Ok(Json(shipment.into()))
}
