//! Application state management.
//!
//! The state is cloned into every handler. All members are cheap clones
//! sharing one underlying instance.

use axum_helpers::JwtAuth;
use domain_shop::ShopContext;
use mediator::{CancellationToken, Mediator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Request pipeline every command and query goes through
    pub mediator: Arc<Mediator>,
    /// Store handle, used directly only by the readiness probe
    pub context: ShopContext,
    /// Issues session tokens on register/login and verifies them on protected routes
    pub jwt: JwtAuth,
    /// Cancelled on shutdown; threaded through every pipeline call
    pub cancel: CancellationToken,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        mediator: Arc<Mediator>,
        context: ShopContext,
        jwt: JwtAuth,
        cancel: CancellationToken,
        secure_cookies: bool,
    ) -> Self {
        Self {
            mediator,
            context,
            jwt,
            cancel,
            secure_cookies,
        }
    }
}
