//! # Axum Helpers
//!
//! HTTP plumbing shared by the shop API.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError` and the problem payload every failure renders as
//! - **[`extractors`]**: UUID path and rejection-aware JSON/query extractors
//! - **[`auth`]**: stateless JWT issuing, cookie helpers and auth middleware
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router};
//! use core_config::{cors::CorsConfig, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes, &CorsConfig::default())?;
//! create_app(router, &ServerConfig::default(), shutdown).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AuthUser, JwtAuth, JwtClaims, JwtConfig, TOKEN_COOKIE, jwt_auth_middleware, require_admin,
};
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{JsonBody, QueryParams, UuidPath};
pub use server::{
    HealthCheckFuture, ShutdownCoordinator, create_app, create_router, health_router,
    run_health_checks,
};
