use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::post,
};
use axum_helpers::{
    AppError, JsonBody,
    auth::{clear_token_cookie, token_cookie},
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        UnauthorizedResponse,
    },
};
use domain_shop::identity::{AuthenticateUser, RegisterUser};
use domain_shop::models::User;
use utoipa::OpenApi;

use super::dto::{LoginRequest, RegisterRequest, UserResponse};
use crate::state::AppState;

pub const TAG: &str = "auth";

#[derive(OpenApi)]
#[openapi(
    paths(register, login, logout),
    components(
        schemas(RegisterRequest, LoginRequest, UserResponse),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Registration and cookie sessions"))
)]
pub struct ApiDoc;

pub fn router(state: &AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state.clone())
}

/// Profile body plus the session cookie.
fn session_response(state: &AppState, user: User) -> Result<Response, AppError> {
    let token = state
        .jwt
        .create_token(
            &user.id.to_string(),
            &user.email,
            &user.full_name(),
            &user.roles(),
        )
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let cookie = token_cookie(&token, state.jwt.ttl_seconds(), state.secure_cookies);
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {}", e)))?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserResponse::from(user)),
    )
        .into_response())
}

/// Register a customer account and start a session
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered; `token` cookie set", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterRequest>,
) -> Result<Response, AppError> {
    let request = RegisterUser {
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        password: input.password,
    };
    let user = state.mediator.send(request, &state.cancel).await?;

    tracing::info!(user_id = %user.id, "User registered");
    session_response(&state, user)
}

/// Exchange credentials for a session cookie
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; `token` cookie set", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    let request = AuthenticateUser {
        email: input.email,
        password: input.password,
    };
    let user = state.mediator.send(request, &state.cancel).await?;

    session_response(&state, user)
}

/// End the session by expiring the cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    responses((status = 204, description = "Cookie cleared"))
)]
async fn logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let cookie = HeaderValue::from_str(&clear_token_cookie(state.secure_cookies))
        .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {}", e)))?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
    )
        .into_response())
}
