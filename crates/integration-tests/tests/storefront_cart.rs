//! Integration tests for the session cart flow and checkout handoff.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p madreselva-cli -- seed)
//! - The storefront running (cargo run -p madreselva-storefront)
//!
//! Each test uses its own cookie jar, so carts never leak between tests.

use reqwest::{Client, StatusCode, redirect::Policy};
use serde_json::{Value, json};

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with its own cookie jar (one shopping session).
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

async fn first_variant_id(client: &Client) -> String {
    let resp = client
        .get(format!("{}/products/pijama-saten-rosa", base_url()))
        .send()
        .await
        .expect("request failed");
    let product: Value = resp.json().await.expect("invalid JSON body");
    product["variants"][0]["id"]
        .as_str()
        .expect("variant id")
        .to_string()
}

async fn cart(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("invalid JSON body")
}

async fn add_line(client: &Client, variant_id: &str, quantity: i64) -> Value {
    let resp = client
        .post(format!("{}/cart/lines", base_url()))
        .json(&json!({ "variant_id": variant_id, "quantity": quantity }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("invalid JSON body")
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_re_adding_merges_lines() {
    let client = session_client();
    let variant_id = first_variant_id(&client).await;

    add_line(&client, &variant_id, 1).await;
    let cart = add_line(&client, &variant_id, 1).await;

    let lines = cart["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(cart["total_quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_set_zero_removes_line() {
    let client = session_client();
    let variant_id = first_variant_id(&client).await;

    add_line(&client, &variant_id, 2).await;

    let resp = client
        .patch(format!("{}/cart/lines", base_url()))
        .json(&json!({ "variant_id": variant_id, "quantity": 0 }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = cart(&client).await;
    assert_eq!(cart["total_quantity"], 0);
    assert!(cart["lines"].as_array().expect("lines").is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_unknown_variant_is_rejected() {
    let client = session_client();

    let resp = client
        .post(format!("{}/cart/lines", base_url()))
        .json(&json!({
            "variant_id": uuid::Uuid::new_v4().to_string(),
            "quantity": 1
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_subtotal_matches_lines() {
    let client = session_client();
    let variant_id = first_variant_id(&client).await;

    let cart = add_line(&client, &variant_id, 2).await;

    let unit: f64 = cart["lines"][0]["variant"]["price"]["amount"]
        .as_str()
        .expect("amount")
        .parse()
        .expect("numeric amount");
    let subtotal: f64 = cart["cost"]["subtotal"]["amount"]
        .as_str()
        .expect("amount")
        .parse()
        .expect("numeric amount");

    assert!((subtotal - unit * 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_empty_cart_checkout_redirects_with_greeting() {
    let client = session_client();

    let resp = client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");

    assert!(location.starts_with("https://wa.me/"));
    // Generic consultation greeting, not an itemized order.
    assert!(location.contains("consulta"));
}

#[tokio::test]
#[ignore = "Requires running storefront with seeded database"]
async fn test_checkout_redirects_with_order_summary() {
    let client = session_client();
    let variant_id = first_variant_id(&client).await;
    add_line(&client, &variant_id, 1).await;

    let resp = client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");

    assert!(location.starts_with("https://wa.me/"));
    assert!(location.contains("comprar"));
}
