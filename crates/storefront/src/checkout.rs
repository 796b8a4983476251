//! Checkout handoff.
//!
//! There is no in-system payment capture: checkout serializes the current
//! cart into a human-readable order summary and redirects the shopper to a
//! pre-filled WhatsApp conversation with the store. The actual transaction
//! happens in that conversation, so this module carries no retry or
//! idempotency guarantees and validates nothing beyond "cart is empty or
//! not".

use crate::cart::{Cart, CartLine};

/// Builds WhatsApp handoff URLs for the configured store contact.
#[derive(Debug, Clone)]
pub struct CheckoutHandoff {
    store_name: String,
    phone: String,
}

impl CheckoutHandoff {
    /// Create a handoff builder for a store name and WhatsApp phone number
    /// (international format, digits only).
    pub fn new(store_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            phone: phone.into(),
        }
    }

    /// The handoff URL for the given cart snapshot.
    ///
    /// An absent or empty cart produces a generic consultation greeting
    /// instead of a line-itemized order.
    #[must_use]
    pub fn handoff_url(&self, cart: Option<&Cart>) -> String {
        let message = match cart {
            Some(cart) if !cart.lines.is_empty() => self.order_summary(cart),
            _ => self.greeting(),
        };

        format!(
            "https://wa.me/{}?text={}",
            self.phone,
            urlencoding::encode(&message)
        )
    }

    fn greeting(&self) -> String {
        format!(
            "Hola, me han redirigido de la web {}. Quisiera hacer una consulta.",
            self.store_name
        )
    }

    fn order_summary(&self, cart: &Cart) -> String {
        let items = cart
            .lines
            .iter()
            .map(line_summary)
            .collect::<Vec<_>>()
            .join("\n");

        let total = &cart.cost.total;
        format!(
            "Hola, me han redirigido de la web {}. Quisiera comprar:\n\n{items}\n\nTotal: ${} {}",
            self.store_name,
            total.amount.round_dp(2),
            total.currency_code,
        )
    }
}

/// One bullet per line: title, size/color when present, quantity.
fn line_summary(line: &CartLine) -> String {
    let talla = option_value(line, "talla");
    let color = option_value(line, "color");

    let details = [
        talla.map(|t| format!("talle {t}")),
        color.map(|c| format!("color {c}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    if details.is_empty() {
        format!("• {} (cantidad: {})", line.snapshot.title, line.quantity)
    } else {
        format!(
            "• {} {details} (cantidad: {})",
            line.snapshot.title, line.quantity
        )
    }
}

fn option_value<'a>(line: &'a CartLine, name: &str) -> Option<&'a str> {
    line.snapshot
        .selected_options
        .iter()
        .find(|o| o.name.eq_ignore_ascii_case(name))
        .map(|o| o.value.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use url::Url;

    use madreselva_core::{CartId, CartLineId, CurrencyCode};

    use crate::cart::tests::{display_snapshot, variant_ref};
    use crate::cart::{Cart, CartLine};

    use super::*;

    fn handoff() -> CheckoutHandoff {
        CheckoutHandoff::new("Madreselva", "5493544000000")
    }

    fn cart_with_line(quantity: u32) -> Cart {
        let variant = variant_ref(79_999, 10);
        Cart::assemble(
            CartId::generate(),
            vec![CartLine {
                id: CartLineId::generate(),
                quantity,
                variant,
                snapshot: display_snapshot("Pijama Satén"),
            }],
            CurrencyCode::ARS,
        )
    }

    fn decoded_text(url: &str) -> String {
        let parsed = Url::parse(url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_empty_cart_gets_generic_greeting() {
        let empty = Cart::empty(CartId::generate(), CurrencyCode::ARS);
        let url = handoff().handoff_url(Some(&empty));

        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("wa.me"));
        assert_eq!(parsed.path(), "/5493544000000");

        let text = decoded_text(&url);
        assert_eq!(
            text,
            "Hola, me han redirigido de la web Madreselva. Quisiera hacer una consulta."
        );
        assert!(!text.contains('•'));
    }

    #[test]
    fn test_missing_cart_gets_generic_greeting() {
        let url = handoff().handoff_url(None);
        assert!(decoded_text(&url).contains("Quisiera hacer una consulta"));
    }

    #[test]
    fn test_order_summary_itemizes_lines() {
        let url = handoff().handoff_url(Some(&cart_with_line(2)));
        let text = decoded_text(&url);

        assert!(text.contains("Quisiera comprar:"));
        assert!(text.contains("• Pijama Satén talle M color Rosa (cantidad: 2)"));
        assert!(text.contains("Total: $159998 ARS"));
    }

    #[test]
    fn test_line_without_options_omits_details() {
        let mut cart = cart_with_line(1);
        cart.lines
            .first_mut()
            .unwrap()
            .snapshot
            .selected_options
            .clear();

        let text = decoded_text(&handoff().handoff_url(Some(&cart)));
        assert!(text.contains("• Pijama Satén (cantidad: 1)"));
    }

    #[test]
    fn test_total_uses_authoritative_undiscounted_amount() {
        let cart = Cart::assemble(
            CartId::generate(),
            vec![CartLine {
                id: CartLineId::generate(),
                quantity: 1,
                variant: variant_ref(100, 10),
                snapshot: display_snapshot("Pijama Satén"),
            }],
            CurrencyCode::ARS,
        );

        // Presentation shows 90 with a 10% discount configured...
        assert_eq!(cart.display_total(10).amount, Decimal::new(9_000, 2));

        // ...but the handoff carries the cart's authoritative total.
        let text = decoded_text(&handoff().handoff_url(Some(&cart)));
        assert!(text.contains("Total: $100 ARS"));
    }
}
