//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Products
//! GET  /products                        - Product listing (q, color, size, sort)
//! GET  /products/{handle}               - Product detail
//! GET  /products/{handle}/recommendations - Same-collection recommendations
//!
//! # Collections
//! GET  /collections                     - Public collection listing
//! GET  /collections/{handle}            - Collection detail
//! GET  /collections/{handle}/products   - Collection products (same query grammar)
//!
//! # Cart
//! GET    /cart                          - Current session's cart snapshot
//! POST   /cart/lines                    - Add a variant (incremental quantity)
//! PATCH  /cart/lines                    - Set a variant's absolute quantity
//! DELETE /cart/lines                    - Remove a variant's line
//! POST   /cart/checkout                 - Redirect to the WhatsApp handoff
//! ```

pub mod cart;
pub mod collections;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
        .route("/{handle}/recommendations", get(products::recommendations))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{handle}", get(collections::show))
        .route("/{handle}/products", get(collections::products))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route(
            "/lines",
            post(cart::add).patch(cart::update).delete(cart::remove),
        )
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        .nest("/cart", cart_routes())
}
