//! Stateless JWT authentication.
//!
//! Tokens are HS256 JWTs carried either in an `Authorization: Bearer` header
//! or in the HttpOnly [`TOKEN_COOKIE`]. The middleware verifies them and puts
//! [`JwtClaims`] into the request extensions; handlers read them through
//! [`AuthUser`].
//!
//! ```ignore
//! let admin_only = Router::new()
//!     .route("/categories", post(create_category))
//!     .route_layer(axum::middleware::from_fn(require_admin))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod cookie;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use cookie::{TOKEN_COOKIE, clear_token_cookie, token_cookie};
pub use jwt::{ADMIN_ROLE, JwtAuth, JwtClaims, JwtError};
pub use middleware::{AuthUser, jwt_auth_middleware, require_admin};
