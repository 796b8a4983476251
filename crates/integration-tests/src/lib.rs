//! Integration tests for the Madreselva storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p madreselva-cli -- migrate
//! cargo run -p madreselva-cli -- seed
//!
//! # Start the storefront
//! cargo run -p madreselva-storefront
//!
//! # Run integration tests
//! cargo test -p madreselva-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Product/collection/search endpoint tests
//! - `storefront_cart` - Session cart flow and checkout handoff tests
//!
//! Tests are `#[ignore]`d by default because they require a running server
//! with a seeded database. The base URL is configurable via
//! `STOREFRONT_BASE_URL` (default `http://localhost:3000`).
