//! Session-stored state.
//!
//! The session cookie is the shopper's only identity: no accounts exist,
//! and a lost cookie means a lost cart.

/// Session keys for shopping state.
pub mod keys {
    /// Key for the opaque cart session token.
    ///
    /// Created on the first cart mutation and used as the sole lookup key
    /// for "the current cart".
    pub const CART_TOKEN: &str = "cart_token";
}
