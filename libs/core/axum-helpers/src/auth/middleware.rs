use super::{TOKEN_COOKIE, jwt::JwtAuth, jwt::JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};

/// Bearer header first, then the token cookie.
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
        })
}

/// Rejects requests without a valid token with 401.
///
/// On success the decoded [`JwtClaims`] are stored in the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(request.headers()) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("Authentication required".to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Admin policy. Must run inside [`jwt_auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<JwtClaims>() {
        Some(claims) if claims.is_admin() => Ok(next.run(request).await),
        Some(claims) => {
            tracing::info!(user = %claims.sub, "Admin role required");
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
        None => Err(AppError::Unauthorized("Authentication required".to_string())),
    }
}

/// Claims of the authenticated caller.
pub struct AuthUser(pub JwtClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
    };
    use tower::ServiceExt;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    fn app(auth: JwtAuth) -> Router {
        Router::new()
            .route("/admin", get(|AuthUser(claims): AuthUser| async move { claims.email }))
            .route_layer(from_fn(require_admin))
            .route_layer(from_fn_with_state(auth, jwt_auth_middleware))
    }

    async fn status_for(request: axum::http::Request<Body>) -> StatusCode {
        app(auth()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let request = axum::http::Request::get("/admin").body(Body::empty()).unwrap();
        assert_eq!(status_for(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let request = axum::http::Request::get("/admin")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customer_token_is_forbidden() {
        let token = auth()
            .create_token("u1", "c@example.com", "C", &["customer".to_string()])
            .unwrap();
        let request = axum::http::Request::get("/admin")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(request).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_cookie_is_accepted() {
        let token = auth()
            .create_token("u1", "a@example.com", "A", &["admin".to_string()])
            .unwrap();
        let request = axum::http::Request::get("/admin")
            .header(header::COOKIE, format!("theme=dark; {TOKEN_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_for(request).await, StatusCode::OK);
    }
}
