//! Product catalog endpoints through the full router.

mod common;

use axum::http::{Method, StatusCode, header};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_product_lifecycle() {
    let app = TestApp::new();
    let token = app.admin_token();
    let category = app.create_category("Electronics").await;
    let category_id = category["id"].as_str().unwrap();

    let created = app
        .post(
            "/api/products",
            json!({
                "name": "Keyboard",
                "stock": 5,
                "price": 8999,
                "categoryIds": [category_id],
            }),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(
        created.header(header::LOCATION),
        Some(format!("/api/products/{id}").as_str())
    );
    assert_eq!(created.body["categories"][0]["id"], category_id);

    let fetched = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["price"], 8999);

    let updated = app
        .send(
            Method::PUT,
            &format!("/api/products/{id}"),
            Some(json!({ "name": "Keyboard Pro", "stock": 2, "price": 12999 })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Keyboard Pro");
    assert_eq!(updated.body["categories"], json!([]));

    let deleted = app
        .send(Method::DELETE, &format!("/api/products/{id}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_require_admin() {
    let app = TestApp::new();
    let product = app.create_product("Lamp", 1, &[]).await;
    let uri = format!("/api/products/{}", product["id"].as_str().unwrap());
    let body = json!({ "name": "Lamp", "stock": 1, "price": 100 });
    let customer = app.customer_token();

    let anonymous = [
        app.send(Method::POST, "/api/products", Some(body.clone()), None).await,
        app.send(Method::PUT, &uri, Some(body.clone()), None).await,
        app.send(Method::DELETE, &uri, None, None).await,
    ];
    for response in anonymous {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let forbidden = app
        .send(Method::DELETE, &uri, None, Some(&customer))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mutations_reject_invalid_tokens() {
    let app = TestApp::new();
    let product = app.create_product("Lamp", 1, &[]).await;
    let uri = format!("/api/products/{}", product["id"].as_str().unwrap());
    let body = json!({ "name": "Lamp", "stock": 1, "price": 100 });

    for token in ["not-a-jwt".to_string(), app.expired_admin_token()] {
        let create = app
            .send(Method::POST, "/api/products", Some(body.clone()), Some(&token))
            .await;
        assert_eq!(create.status, StatusCode::UNAUTHORIZED);

        let update = app
            .send(Method::PUT, &uri, Some(body.clone()), Some(&token))
            .await;
        assert_eq!(update.status, StatusCode::UNAUTHORIZED);

        let delete = app.send(Method::DELETE, &uri, None, Some(&token)).await;
        assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
    }

    let still_there = app.get(&uri, None).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_product_validation_and_unknown_category_ignored() {
    let app = TestApp::new();
    let token = app.admin_token();

    let invalid = app
        .post(
            "/api/products",
            json!({ "name": "", "stock": -1, "price": -5 }),
            Some(&token),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    for field in ["name", "stock", "price"] {
        assert!(invalid.body["details"][field].is_array(), "{field}");
    }

    let office = app.create_category("Office").await;
    let unknown_category = app
        .post(
            "/api/products",
            json!({
                "name": "Desk",
                "stock": 1,
                "price": 100,
                "categoryIds": ["0193a1b2-0000-7000-8000-000000000001", office["id"]],
            }),
            Some(&token),
        )
        .await;
    assert_eq!(unknown_category.status, StatusCode::CREATED);
    let categories = unknown_category.body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["id"], office["id"]);
}

#[tokio::test]
async fn test_get_product_with_malformed_id() {
    let app = TestApp::new();

    let response = app.get("/api/products/not-a-uuid", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_rejects_out_of_range_paging() {
    let app = TestApp::new();

    for query in ["page=0", "size=0", "size=26", "sort=weight", "order=sideways"] {
        let response = app.get(&format!("/api/products?{query}"), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR", "{query}");
    }

    let unparseable = app.get("/api/products?page=first", None).await;
    assert_eq!(unparseable.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_sorts_and_pages() {
    let app = TestApp::new();
    for name in ["Cable", "Adapter", "Battery"] {
        app.create_product(name, 1, &[]).await;
    }

    let response = app
        .get("/api/products?sort=NAME&order=desc&page=1&size=2", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Cable", "Battery"]);

    let second_page = app
        .get("/api/products?sort=name&order=desc&page=2&size=2", None)
        .await;
    assert_eq!(second_page.body.as_array().unwrap().len(), 1);
    assert_eq!(second_page.body[0]["name"], "Adapter");
}

#[tokio::test]
async fn test_products_by_category() {
    let app = TestApp::new();
    let tools = app.create_category("Tools").await;
    let tools_id = tools["id"].as_str().unwrap();
    app.create_product("Hammer", 3, &[tools_id]).await;
    app.create_product("Pillow", 3, &[]).await;

    for segment in [tools_id, "tools"] {
        let response = app
            .get(&format!("/api/categories/{segment}/products"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let products = response.body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Hammer");
    }

    let missing = app.get("/api/categories/nothing/products", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let invalid = app.get("/api/categories/tools/products?size=100", None).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}
