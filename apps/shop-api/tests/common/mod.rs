//! Shared harness for the HTTP tests: the full router over the in-memory
//! store, with the event loop running in the background.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum_helpers::{JwtAuth, JwtConfig};
use core_config::{AppInfo, cors::CorsConfig};
use domain_shop::{InMemoryStore, run_event_loop};
use http_body_util::BodyExt;
use mediator::CancellationToken;
use serde_json::{Value, json};
use shop_api::{build_router, build_state};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-with-32-chars!";
pub const PASSWORD: &str = "Passw0rd!";

pub struct TestApp {
    router: Router,
    jwt: JwtAuth,
    cancel: CancellationToken,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        let jwt = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        let cancel = CancellationToken::new();
        let (state, events) =
            build_state(InMemoryStore::new(), jwt.clone(), cancel.clone(), false).unwrap();

        tokio::spawn(run_event_loop(
            state.mediator.clone(),
            events,
            cancel.clone(),
        ));

        let info = AppInfo {
            name: "shop_api",
            version: "test",
        };
        let router = build_router(&state, info, &CorsConfig::default());

        Self {
            router,
            jwt,
            cancel,
        }
    }

    /// Token for an administrator that does not exist in the store.
    pub fn admin_token(&self) -> String {
        self.jwt
            .create_token(
                &Uuid::now_v7().to_string(),
                "admin@example.com",
                "Admin",
                &["admin".to_string()],
            )
            .unwrap()
    }

    /// Admin token signed with the right secret that expired an hour ago.
    pub fn expired_admin_token(&self) -> String {
        let config = JwtConfig::new(SECRET).unwrap().with_ttl(-3600);
        JwtAuth::new(&config)
            .create_token(
                &Uuid::now_v7().to_string(),
                "admin@example.com",
                "Admin",
                &["admin".to_string()],
            )
            .unwrap()
    }

    pub fn customer_token(&self) -> String {
        self.jwt
            .create_token(
                &Uuid::now_v7().to_string(),
                "customer@example.com",
                "Customer",
                &["customer".to_string()],
            )
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.send(Method::POST, uri, Some(body), token).await
    }

    /// Registers a customer and returns the session token from the cookie.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": email,
                    "password": PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        let cookie = response.header(header::SET_COOKIE).unwrap();
        cookie_token(cookie).to_string()
    }

    pub async fn create_category(&self, name: &str) -> Value {
        let token = self.admin_token();
        let response = self
            .post("/api/categories", json!({ "name": name }), Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    pub async fn create_product(&self, name: &str, stock: i32, category_ids: &[&str]) -> Value {
        let token = self.admin_token();
        let response = self
            .post(
                "/api/products",
                json!({
                    "name": name,
                    "stock": stock,
                    "price": 1999,
                    "categoryIds": category_ids,
                }),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Value of the `token` cookie in a `Set-Cookie` header.
pub fn cookie_token(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("token="))
        .unwrap_or_default()
}
