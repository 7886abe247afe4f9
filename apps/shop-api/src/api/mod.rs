use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use axum_helpers::{jwt_auth_middleware, require_admin};

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod dto;
pub mod health;
pub mod orders;
pub mod products;
pub mod shipments;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix is added by `create_router`.
///
/// Returns a stateless Router: every sub-router has its state applied.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state))
        .nest("/categories", categories::router(state))
        .nest("/products", products::router(state))
        .nest(
            "/orders",
            orders::router(state).merge(shipments::order_shipments_router(state)),
        )
        .nest("/shipments", shipments::router(state))
}

/// Router with the `/ready` endpoint checking the store.
///
/// Merged next to the stateless router built by `create_router`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Requires a valid token on every route of `router`.
pub(crate) fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.jwt.clone(), jwt_auth_middleware))
}

/// Requires a valid token carrying the admin role on every route of `router`.
pub(crate) fn admin_only(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    authenticated(router.route_layer(from_fn(require_admin)), state)
}

/// `Location` header value for a freshly created resource.
pub(crate) fn location(path: &str, id: uuid::Uuid) -> String {
    format!("/api/{}/{}", path, id)
}
