//! Cart route handlers.
//!
//! All handlers resolve "the current session's cart" through an opaque
//! token stored in the session. The token is created on the first mutation
//! (create-on-write); plain reads never create anything.

use axum::{
    Json,
    extract::State,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use madreselva_core::{CartId, CurrencyCode, Money, VariantId};

use crate::cart::{Cart, CartCost, CartLine};
use crate::error::{AppError, Result};
use crate::models::session::keys;
use crate::state::AppState;

// =============================================================================
// Payloads
// =============================================================================

/// Cart response body: the authoritative snapshot plus the presentation-only
/// discounted total.
#[derive(Debug, Serialize)]
pub struct CartPayload {
    /// Cart ID; absent when the session has no cart yet.
    pub id: Option<CartId>,
    /// Cart lines.
    pub lines: Vec<CartLine>,
    /// Sum of line quantities.
    pub total_quantity: u32,
    /// Authoritative cost summary (undiscounted).
    pub cost: CartCost,
    /// Subtotal after the flat storewide discount - display state only,
    /// never persisted.
    pub display_total: Money,
}

impl CartPayload {
    fn from_cart(cart: Cart, discount_percent: u8) -> Self {
        let display_total = cart.display_total(discount_percent);
        Self {
            id: Some(cart.id),
            lines: cart.lines,
            total_quantity: cart.total_quantity,
            cost: cart.cost,
            display_total,
        }
    }

    fn empty(currency: CurrencyCode) -> Self {
        let zero = Money::zero(currency);
        Self {
            id: None,
            lines: Vec::new(),
            total_quantity: 0,
            cost: CartCost {
                subtotal: zero,
                total: zero,
                total_tax: zero,
            },
            display_total: zero,
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    /// Variant to add.
    pub variant_id: VariantId,
    /// Units to add (default 1).
    pub quantity: Option<i64>,
}

/// Set line quantity request.
#[derive(Debug, Deserialize)]
pub struct SetLineRequest {
    /// Variant whose line to set.
    pub variant_id: VariantId,
    /// Absolute quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveLineRequest {
    /// Variant whose line to remove.
    pub variant_id: VariantId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart session token, if one has been created.
async fn cart_token(session: &Session) -> Result<Option<Uuid>> {
    session
        .get::<Uuid>(keys::CART_TOKEN)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))
}

/// Get the cart session token, creating one on first mutation.
async fn ensure_cart_token(session: &Session) -> Result<Uuid> {
    if let Some(token) = cart_token(session).await? {
        return Ok(token);
    }

    let token = Uuid::new_v4();
    session
        .insert(keys::CART_TOKEN, token)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    Ok(token)
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart snapshot. Never creates a cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartPayload>> {
    let discount = state.config().discount_percent;

    let cart = match cart_token(&session).await? {
        Some(token) => state.carts().snapshot(token).await?,
        None => None,
    };

    Ok(Json(cart.map_or_else(
        || CartPayload::empty(state.config().default_currency),
        |cart| CartPayload::from_cart(cart, discount),
    )))
}

/// Add units of a variant to the cart, merging into an existing line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddLineRequest>,
) -> Result<Json<CartPayload>> {
    let token = ensure_cart_token(&session).await?;
    let cart = state
        .carts()
        .add_line(token, form.variant_id, form.quantity.unwrap_or(1))
        .await?;

    Ok(Json(CartPayload::from_cart(
        cart,
        state.config().discount_percent,
    )))
}

/// Set a variant's line to an absolute quantity (zero removes it).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SetLineRequest>,
) -> Result<Json<CartPayload>> {
    let token = ensure_cart_token(&session).await?;
    let cart = state
        .carts()
        .set_line_quantity(token, form.variant_id, form.quantity)
        .await?;

    Ok(Json(CartPayload::from_cart(
        cart,
        state.config().discount_percent,
    )))
}

/// Remove a variant's line. A no-op when absent.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RemoveLineRequest>,
) -> Result<Json<CartPayload>> {
    let token = ensure_cart_token(&session).await?;
    let cart = state.carts().remove_line(token, form.variant_id).await?;

    Ok(Json(CartPayload::from_cart(
        cart,
        state.config().discount_percent,
    )))
}

/// Redirect to the WhatsApp checkout handoff.
///
/// An empty (or missing) cart still redirects, with a generic greeting
/// instead of an order summary.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let cart = match cart_token(&session).await? {
        Some(token) => state.carts().snapshot(token).await?,
        None => None,
    };

    let url = state.checkout().handoff_url(cart.as_ref());
    Ok(Redirect::to(&url))
}
