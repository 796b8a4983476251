//! Cart aggregate.
//!
//! The authoritative mapping from a shopping session to its line items.
//! Derived fields (`total_quantity`, `cost`) are recomputed from the current
//! lines on every assembly - carts are tiny, so correctness wins over
//! incremental caching.
//!
//! Each line splits its data into two explicit halves:
//!
//! - [`DisplaySnapshot`] - product display fields frozen when the line was
//!   created; never re-synced if the product later changes.
//! - [`VariantRef`] - the live variant fields (price, availability,
//!   inventory) read fresh on every assembly, so cart prices float with
//!   catalog price changes until checkout.

pub mod service;

use rust_decimal::Decimal;
use serde::Serialize;

use madreselva_core::{CartId, CartLineId, CurrencyCode, Handle, Money, ProductId, VariantId};

use crate::catalog::{Image, SelectedOption};

/// Live variant fields, re-read from the catalog on every cart assembly.
/// Used only for price, availability, and inventory lookups.
#[derive(Debug, Clone, Serialize)]
pub struct VariantRef {
    /// Variant ID.
    pub id: VariantId,
    /// Current price - never frozen into the line.
    pub price: Money,
    /// Whether the variant is currently available for sale.
    pub available_for_sale: bool,
    /// Units currently in stock; line quantities are clamped against this.
    pub inventory_quantity: i32,
}

/// Display fields frozen into a line at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySnapshot {
    /// Parent product ID.
    pub product_id: ProductId,
    /// Product handle at the time the line was created.
    pub handle: Handle,
    /// Product title at the time the line was created.
    pub title: String,
    /// Variant title at the time the line was created.
    pub variant_title: String,
    /// The variant's selected options at the time the line was created.
    pub selected_options: Vec<SelectedOption>,
    /// Featured image at the time the line was created.
    pub featured_image: Option<Image>,
}

/// One line in a cart: this variant, this quantity.
///
/// A line exists only with `quantity >= 1`; setting a quantity to zero
/// removes the line instead.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// Line ID.
    pub id: CartLineId,
    /// Quantity, always >= 1 while the line exists.
    pub quantity: u32,
    /// Live variant reference (price, availability, inventory).
    pub variant: VariantRef,
    /// Frozen product display fields.
    pub snapshot: DisplaySnapshot,
}

impl CartLine {
    /// Cost of this line at the variant's current price.
    #[must_use]
    pub fn line_cost(&self) -> Money {
        self.variant.price.times(self.quantity)
    }
}

/// Cart cost summary. Tax is always zero in this store; the authoritative
/// total equals the subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartCost {
    /// Sum of line costs.
    pub subtotal: Money,
    /// Authoritative total (equals the subtotal).
    pub total: Money,
    /// Always zero.
    pub total_tax: Money,
}

/// A shopping cart with recomputed derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Cart lines, at most one per variant.
    pub lines: Vec<CartLine>,
    /// Sum of line quantities.
    pub total_quantity: u32,
    /// Cost summary.
    pub cost: CartCost,
}

impl Cart {
    /// Assemble a cart from its lines, recomputing every derived field.
    ///
    /// The currency is taken from the first line; an empty cart falls back
    /// to the configured default currency.
    #[must_use]
    pub fn assemble(id: CartId, lines: Vec<CartLine>, default_currency: CurrencyCode) -> Self {
        let currency = lines
            .first()
            .map_or(default_currency, |l| l.variant.price.currency_code);

        let total_quantity = lines.iter().map(|l| l.quantity).sum();
        let subtotal = lines
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc + l.line_cost().amount);

        Self {
            id,
            lines,
            total_quantity,
            cost: CartCost {
                subtotal: Money::new(subtotal, currency),
                total: Money::new(subtotal, currency),
                total_tax: Money::zero(currency),
            },
        }
    }

    /// An empty cart in the given currency.
    #[must_use]
    pub fn empty(id: CartId, currency: CurrencyCode) -> Self {
        Self::assemble(id, Vec::new(), currency)
    }

    /// The line for a variant, if present.
    #[must_use]
    pub fn line_for(&self, variant_id: VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.variant.id == variant_id)
    }

    /// The quantity currently held for a variant (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, variant_id: VariantId) -> u32 {
        self.line_for(variant_id).map_or(0, |l| l.quantity)
    }

    /// Display total after the flat storewide discount.
    ///
    /// This is a presentation-only figure: the persisted cost keeps the
    /// undiscounted subtotal as the source of truth.
    #[must_use]
    pub fn display_total(&self, discount_percent: u8) -> Money {
        let discount = Decimal::from(discount_percent.min(100));
        let factor = (Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED;
        Money::new(
            (self.cost.subtotal.amount * factor).round_dp(2),
            self.cost.subtotal.currency_code,
        )
    }
}

/// Clamp a requested line quantity into `[0, inventory]`.
///
/// A result of 0 means the mutation resolves to "no line" - callers must
/// handle that explicitly (skip the write, or delete an existing line).
#[must_use]
pub fn clamp_quantity(requested: i64, inventory_quantity: i32) -> u32 {
    let ceiling = i64::from(inventory_quantity.max(0));
    u32::try_from(requested.clamp(0, ceiling)).unwrap_or(0)
}

// =============================================================================
// Optimistic client state
// =============================================================================

/// A cart view tagged with its provenance.
///
/// `Optimistic` marks a client-side preview applied before the server
/// confirmed a mutation. It is advisory only: whenever an authoritative
/// snapshot arrives it replaces - never merges with - the optimistic view,
/// via [`CartView::reconcile`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "cart", rename_all = "lowercase")]
pub enum CartView {
    /// Server-confirmed snapshot.
    Confirmed(Cart),
    /// Unconfirmed client-side preview.
    Optimistic(Cart),
}

impl CartView {
    /// The underlying cart, regardless of provenance.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        match self {
            Self::Confirmed(cart) | Self::Optimistic(cart) => cart,
        }
    }

    /// Whether this view is server-confirmed.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Replace this view with the server's authoritative snapshot.
    #[must_use]
    pub fn reconcile(self, authoritative: Cart) -> Self {
        Self::Confirmed(authoritative)
    }

    /// Preview adding one unit of a variant, clamped to its inventory.
    ///
    /// Mirrors what the server will do, so the UI can update instantly; the
    /// result is `Optimistic` and must later be reconciled.
    #[must_use]
    pub fn preview_add(
        &self,
        variant: &VariantRef,
        snapshot: &DisplaySnapshot,
        default_currency: CurrencyCode,
    ) -> Self {
        let cart = self.cart();
        let mut lines = cart.lines.clone();

        match lines.iter_mut().find(|l| l.variant.id == variant.id) {
            Some(line) => {
                line.quantity = clamp_quantity(
                    i64::from(line.quantity) + 1,
                    variant.inventory_quantity,
                );
            }
            None => {
                if clamp_quantity(1, variant.inventory_quantity) > 0 {
                    lines.push(CartLine {
                        id: CartLineId::generate(),
                        quantity: 1,
                        variant: variant.clone(),
                        snapshot: snapshot.clone(),
                    });
                }
            }
        }

        Self::Optimistic(Cart::assemble(cart.id, lines, default_currency))
    }

    /// Preview setting a variant's quantity (zero or less removes the line).
    #[must_use]
    pub fn preview_set_quantity(
        &self,
        variant_id: VariantId,
        quantity: i64,
        default_currency: CurrencyCode,
    ) -> Self {
        let cart = self.cart();
        let mut lines = cart.lines.clone();

        if let Some(index) = lines.iter().position(|l| l.variant.id == variant_id) {
            let inventory = lines.get(index).map_or(0, |l| l.variant.inventory_quantity);
            let target = clamp_quantity(quantity, inventory);
            if target == 0 {
                lines.remove(index);
            } else if let Some(line) = lines.get_mut(index) {
                line.quantity = target;
            }
        }

        Self::Optimistic(Cart::assemble(cart.id, lines, default_currency))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn variant_ref(price: i64, inventory: i32) -> VariantRef {
        VariantRef {
            id: VariantId::generate(),
            price: Money::new(Decimal::new(price, 0), CurrencyCode::ARS),
            available_for_sale: true,
            inventory_quantity: inventory,
        }
    }

    pub(crate) fn display_snapshot(title: &str) -> DisplaySnapshot {
        DisplaySnapshot {
            product_id: ProductId::generate(),
            handle: Handle::parse("pijama-saten").unwrap(),
            title: title.to_owned(),
            variant_title: "Rosa / M".to_owned(),
            selected_options: vec![
                SelectedOption {
                    name: "Color".to_owned(),
                    value: "Rosa".to_owned(),
                },
                SelectedOption {
                    name: "Talla".to_owned(),
                    value: "M".to_owned(),
                },
            ],
            featured_image: None,
        }
    }

    fn line(variant: VariantRef, quantity: u32) -> CartLine {
        CartLine {
            id: CartLineId::generate(),
            quantity,
            variant,
            snapshot: display_snapshot("Pijama Satén"),
        }
    }

    #[test]
    fn test_assemble_recomputes_totals() {
        let cart = Cart::assemble(
            CartId::generate(),
            vec![line(variant_ref(100, 10), 2), line(variant_ref(50, 10), 3)],
            CurrencyCode::ARS,
        );

        assert_eq!(cart.total_quantity, 5);
        assert_eq!(cart.cost.subtotal.amount, Decimal::new(350, 0));
        assert_eq!(cart.cost.total.amount, Decimal::new(350, 0));
        assert_eq!(cart.cost.total_tax.amount, Decimal::ZERO);
    }

    #[test]
    fn test_empty_cart_uses_default_currency() {
        let cart = Cart::empty(CartId::generate(), CurrencyCode::ARS);
        assert_eq!(cart.total_quantity, 0);
        assert_eq!(cart.cost.subtotal.currency_code, CurrencyCode::ARS);
        assert_eq!(cart.cost.subtotal.amount, Decimal::ZERO);
    }

    #[test]
    fn test_currency_from_first_line() {
        let mut variant = variant_ref(100, 10);
        variant.price.currency_code = CurrencyCode::USD;
        let cart = Cart::assemble(CartId::generate(), vec![line(variant, 1)], CurrencyCode::ARS);
        assert_eq!(cart.cost.subtotal.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_display_total_applies_discount() {
        let cart = Cart::assemble(
            CartId::generate(),
            vec![line(variant_ref(100, 10), 1)],
            CurrencyCode::ARS,
        );

        let display = cart.display_total(10);
        assert_eq!(display.amount, Decimal::new(9_000, 2));
        // The authoritative subtotal is untouched.
        assert_eq!(cart.cost.subtotal.amount, Decimal::new(100, 0));
    }

    #[test]
    fn test_display_total_zero_discount() {
        let cart = Cart::assemble(
            CartId::generate(),
            vec![line(variant_ref(100, 10), 1)],
            CurrencyCode::ARS,
        );
        assert_eq!(cart.display_total(0).amount, Decimal::new(10_000, 2));
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(3, 10), 3);
        assert_eq!(clamp_quantity(15, 10), 10);
        assert_eq!(clamp_quantity(-2, 10), 0);
        assert_eq!(clamp_quantity(1, 0), 0);
        assert_eq!(clamp_quantity(5, -3), 0);
    }

    #[test]
    fn test_preview_add_then_reconcile_replaces() {
        let variant = variant_ref(100, 5);
        let snapshot = display_snapshot("Pijama Satén");
        let confirmed = Cart::empty(CartId::generate(), CurrencyCode::ARS);
        let cart_id = confirmed.id;

        let view = CartView::Confirmed(confirmed);
        let optimistic = view.preview_add(&variant, &snapshot, CurrencyCode::ARS);
        assert!(!optimistic.is_confirmed());
        assert_eq!(optimistic.cart().total_quantity, 1);

        // The server answers with a different quantity (another tab raced);
        // reconciliation replaces the optimistic view wholesale.
        let server_cart = Cart::assemble(
            cart_id,
            vec![line(variant, 3)],
            CurrencyCode::ARS,
        );
        let reconciled = optimistic.reconcile(server_cart);
        assert!(reconciled.is_confirmed());
        assert_eq!(reconciled.cart().total_quantity, 3);
    }

    #[test]
    fn test_preview_add_clamps_to_inventory() {
        let variant = variant_ref(100, 1);
        let snapshot = display_snapshot("Pijama Satén");
        let base = Cart::assemble(
            CartId::generate(),
            vec![line(variant.clone(), 1)],
            CurrencyCode::ARS,
        );

        let view = CartView::Confirmed(base).preview_add(&variant, &snapshot, CurrencyCode::ARS);
        assert_eq!(view.cart().total_quantity, 1);
    }

    #[test]
    fn test_preview_set_zero_removes_line() {
        let variant = variant_ref(100, 5);
        let base = Cart::assemble(
            CartId::generate(),
            vec![line(variant.clone(), 2)],
            CurrencyCode::ARS,
        );

        let view = CartView::Confirmed(base).preview_set_quantity(variant.id, 0, CurrencyCode::ARS);
        assert!(view.cart().lines.is_empty());
        assert_eq!(view.cart().total_quantity, 0);
    }
}
