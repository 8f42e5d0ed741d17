//! Handler tests for Products domain
//!
//! These drive the products router with `oneshot` against the in-memory
//! repository and check status codes, JSON bodies and stored state.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

fn app() -> Router {
    handlers::router(ProductService::new(InMemoryProductRepository::new()))
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response.into_body()).await)
}

async fn create(app: &Router, body: Value) -> Product {
    let (status, body) = send(app, "POST", "/", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_create_product_returns_201_with_defaults() {
    let app = app();

    let product = create(&app, json!({"name": "  Widget  ", "stock_quantity": 10})).await;

    assert_eq!(product.name, "Widget");
    assert_eq!(product.description, "");
    assert_eq!(product.stock_quantity, 10);
    assert_eq!(product.low_stock_threshold, 5);
    assert_eq!(product.id.len(), 24);
}

#[tokio::test]
async fn test_create_product_missing_fields_is_400() {
    let app = app();

    let (status, body) = send(&app, "POST", "/", Some(json!({"description": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Product validation failed: name: Product name is required, stock_quantity: stock_quantity is required"})
    );
}

#[tokio::test]
async fn test_malformed_json_is_400_with_error_body() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_products_newest_first() {
    let app = app();
    create(&app, json!({"name": "first", "stock_quantity": 1})).await;
    create(&app, json!({"name": "second", "stock_quantity": 2})).await;

    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_value(body).unwrap();
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);
}

#[tokio::test]
async fn test_get_product_status_codes() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 3})).await;

    let (status, body) = send(&app, "GET", &format!("/{}", product.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], product.id.as_str());

    let (status, body) = send(&app, "GET", "/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid Product ID"}));

    let (status, body) = send(&app, "GET", "/000000000000000000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Product not found"}));
}

#[tokio::test]
async fn test_update_product() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 3})).await;
    let uri = format!("/{}", product.id);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"description": "blue", "low_stock_threshold": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "blue");
    assert_eq!(body["low_stock_threshold"], 1);
    assert_eq!(body["name"], "Widget");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"stock_quantity": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Stock quantity cannot be negative"}));
}

#[tokio::test]
async fn test_delete_product_returns_message_and_record() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 3})).await;
    let uri = format!("/{}", product.id);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let deleted: DeleteProductResponse = serde_json::from_value(body).unwrap();
    assert_eq!(deleted.message, "Product deleted successfully");
    assert_eq!(deleted.product, product);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_then_reduce_restores_stock() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 10})).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/{}/addStock", product.id),
        Some(json!({"amount": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_quantity"], 17);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/{}/reduceStock", product.id),
        Some(json!({"amount": "7"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_quantity"], 10);
}

#[tokio::test]
async fn test_invalid_amount_is_400_and_leaves_stock() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 10})).await;

    for body in [json!({"amount": 0}), json!({"amount": -5}), json!({"amount": "abc"}), json!({})] {
        let (status, response) = send(
            &app,
            "POST",
            &format!("/{}/addStock", product.id),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response,
            json!({"error": "Invalid amount; must be a positive number"})
        );
    }

    let (_, body) = send(&app, "GET", &format!("/{}", product.id), None).await;
    assert_eq!(body["stock_quantity"], 10);
}

#[tokio::test]
async fn test_invalid_id_wins_over_invalid_amount() {
    let app = app();

    let (status, body) = send(&app, "POST", "/abc/reduceStock", Some(json!({"amount": -1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid Product ID"}));
}

#[tokio::test]
async fn test_widget_scenario_insufficient_stock() {
    let app = app();

    let product = create(&app, json!({"name": "Widget", "stock_quantity": 10})).await;
    assert_eq!(product.stock_quantity, 10);
    assert_eq!(product.low_stock_threshold, 5);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/{}/reduceStock", product.id),
        Some(json!({"amount": 15})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Insufficient stock"}));

    let (status, body) = send(&app, "GET", &format!("/{}", product.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock_quantity"], 10);
}

#[tokio::test]
async fn test_low_stock_report() {
    let app = app();
    let below = create(&app, json!({"name": "below", "stock_quantity": 2})).await;
    create(&app, json!({"name": "at", "stock_quantity": 5})).await;
    let custom = create(
        &app,
        json!({"name": "custom", "stock_quantity": 9, "low_stock_threshold": 10}),
    )
    .await;

    let (status, body) = send(&app, "GET", "/alerts/low-stock", None).await;

    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_value(body).unwrap();
    let ids: Vec<_> = products.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![below.id, custom.id]);
}

#[tokio::test]
async fn test_reducing_to_below_threshold_appears_in_report() {
    let app = app();
    let product = create(&app, json!({"name": "Widget", "stock_quantity": 6})).await;

    let (_, body) = send(&app, "GET", "/alerts/low-stock", None).await;
    assert_eq!(body, json!([]));

    send(
        &app,
        "POST",
        &format!("/{}/reduceStock", product.id),
        Some(json!({"amount": 2})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/alerts/low-stock", None).await;
    assert_eq!(body[0]["id"], product.id.as_str());
    assert_eq!(body[0]["stock_quantity"], 4);
}
