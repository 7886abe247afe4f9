//! HTTP surface of the shop backend.
//!
//! Controllers translate requests into pipeline commands and queries, send
//! them through the [`Mediator`] and map the result to a response. The
//! binary in `main.rs` only loads configuration, picks a store and serves
//! the router assembled here; integration tests build the same router over
//! the in-memory store.

use axum::Router;
use axum_helpers::{JwtAuth, create_router, health_router};
use core_config::{AppInfo, cors::CorsConfig};
use domain_shop::{EventReceiver, ShopContext, Store, build_mediator, verify_wiring};
use mediator::{CancellationToken, Mediator};
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use state::AppState;

/// Builds the pipeline over `store` and checks every request type is wired.
///
/// The returned receiver must be drained by `domain_shop::run_event_loop`.
pub fn build_state(
    store: impl Store,
    jwt: JwtAuth,
    cancel: CancellationToken,
    secure_cookies: bool,
) -> eyre::Result<(AppState, EventReceiver)> {
    let (context, events) = ShopContext::new(store);
    let mediator: Mediator = build_mediator(&context)?;
    verify_wiring(&mediator)?;

    let state = AppState::new(Arc::new(mediator), context, jwt, cancel, secure_cookies);
    Ok((state, events))
}

/// The complete application router.
///
/// - `/api/...`: resource routes, with docs and middleware from `create_router`
/// - `/health`: liveness with app name/version
/// - `/ready`: readiness, pings the store
pub fn build_router(state: &AppState, app_info: AppInfo, cors: &CorsConfig) -> Router {
    let api_routes = api::routes(state);

    create_router::<openapi::ApiDoc>(api_routes, cors)
        .merge(health_router(app_info))
        .merge(api::ready_router(state.clone()))
}
