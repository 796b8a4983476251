//! Cart service: session-keyed mutations over an injected store.
//!
//! The aggregate's logic (merge-on-re-add, inventory clamping, total
//! recomputation) lives here against two small traits, so it is exercised in
//! unit tests with in-memory fakes and in production with the Postgres
//! implementations in [`crate::db::carts`].
//!
//! Every mutation resolves "the current session's cart" from an opaque
//! session token, creating the cart on first write. There is no delete
//! operation: clearing all lines leaves an existing cart with zero lines and
//! zero totals.

use uuid::Uuid;

use madreselva_core::{CartId, CurrencyCode, VariantId};

use crate::db::RepositoryError;

use super::{Cart, DisplaySnapshot, VariantRef, clamp_quantity};

/// Errors from cart mutations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The referenced variant does not exist in the catalog. The mutation is
    /// rejected before any write; no partial line is created.
    #[error("variant not found: {0}")]
    VariantNotFound(VariantId),

    /// A negative quantity outside the documented remove paths.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The underlying store failed; the mutation did not commit.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A variant plus the product display context needed to create a new line.
#[derive(Debug, Clone)]
pub struct VariantRecord {
    /// Live variant fields.
    pub variant: VariantRef,
    /// Display fields to freeze into a newly created line.
    pub snapshot: DisplaySnapshot,
}

/// Persistence boundary for carts, keyed by session token.
///
/// Implementations must keep at most one cart per token and at most one line
/// per (cart, variant), and must make each line write atomic on its own -
/// there is no cross-mutation locking, so concurrent writes to the same line
/// are last-write-wins by design.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    /// Load the session's cart with totals recomputed from current lines.
    async fn find(&self, token: Uuid) -> Result<Option<Cart>, RepositoryError>;

    /// Load the session's cart, creating an empty one if none exists.
    async fn find_or_create(&self, token: Uuid) -> Result<Cart, RepositoryError>;

    /// Set a line to an absolute quantity, creating it (with the given
    /// snapshot) when absent. The snapshot is frozen at creation: updates to
    /// an existing line must not touch it.
    async fn write_line(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: u32,
        snapshot: &DisplaySnapshot,
    ) -> Result<(), RepositoryError>;

    /// Delete a line if present.
    async fn delete_line(&self, cart_id: CartId, variant_id: VariantId)
    -> Result<(), RepositoryError>;
}

/// Live variant lookups for price, availability, and inventory.
#[allow(async_fn_in_trait)]
pub trait VariantSource {
    /// Fetch a variant with its display context, or `None` when the id
    /// matches no catalog row.
    async fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, RepositoryError>;
}

/// The cart aggregate service.
pub struct CartService<S, V> {
    store: S,
    variants: V,
    default_currency: CurrencyCode,
}

impl<S: CartStore, V: VariantSource> CartService<S, V> {
    /// Create a new cart service.
    pub const fn new(store: S, variants: V, default_currency: CurrencyCode) -> Self {
        Self {
            store,
            variants,
            default_currency,
        }
    }

    /// The currency used for carts with no lines.
    #[must_use]
    pub const fn default_currency(&self) -> CurrencyCode {
        self.default_currency
    }

    /// Current snapshot of the session's cart, if one exists.
    ///
    /// Never creates a cart: reads are not mutations.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] when the store is unreachable.
    pub async fn snapshot(&self, token: Uuid) -> Result<Option<Cart>, CartError> {
        Ok(self.store.find(token).await?)
    }

    /// Add `quantity` units of a variant to the session's cart.
    ///
    /// Increments the existing line if present, clamped so the resulting
    /// quantity never exceeds the variant's current inventory. A result
    /// clamped to zero is an explicit no-op (the cart itself is still
    /// created). If the clamp lands below an existing quantity - inventory
    /// shrank since the line was written - the line is reduced accordingly.
    ///
    /// # Errors
    ///
    /// [`CartError::VariantNotFound`] when the variant id matches no catalog
    /// row, [`CartError::InvalidQuantity`] for negative quantities,
    /// [`CartError::Repository`] on store failure.
    pub async fn add_line(
        &self,
        token: Uuid,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let record = self.resolve_variant(variant_id).await?;
        let cart = self.store.find_or_create(token).await?;

        let existing = cart.quantity_of(variant_id);
        let target = clamp_quantity(
            i64::from(existing).saturating_add(quantity),
            record.variant.inventory_quantity,
        );

        self.apply_line(&cart, variant_id, existing, target, &record)
            .await?;
        self.reload(token).await
    }

    /// Set a variant's line to exactly `quantity`.
    ///
    /// A quantity of zero or less is equivalent to [`Self::remove_line`].
    /// A positive quantity for a line that does not exist yet creates it
    /// with the absolute quantity (clamped to inventory).
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_line`].
    pub async fn set_line_quantity(
        &self,
        token: Uuid,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        if quantity <= 0 {
            return self.remove_line(token, variant_id).await;
        }

        let record = self.resolve_variant(variant_id).await?;
        let cart = self.store.find_or_create(token).await?;

        let existing = cart.quantity_of(variant_id);
        let target = clamp_quantity(quantity, record.variant.inventory_quantity);

        self.apply_line(&cart, variant_id, existing, target, &record)
            .await?;
        self.reload(token).await
    }

    /// Remove a variant's line from the session's cart.
    ///
    /// A no-op (not an error) when no such line exists; calling it twice has
    /// the same effect as once.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Repository`] when the store is unreachable.
    pub async fn remove_line(&self, token: Uuid, variant_id: VariantId) -> Result<Cart, CartError> {
        let cart = self.store.find_or_create(token).await?;

        if cart.line_for(variant_id).is_some() {
            self.store.delete_line(cart.id, variant_id).await?;
        }

        self.reload(token).await
    }

    async fn resolve_variant(&self, variant_id: VariantId) -> Result<VariantRecord, CartError> {
        self.variants
            .variant(variant_id)
            .await?
            .ok_or(CartError::VariantNotFound(variant_id))
    }

    /// Write or delete a line so it ends at `target` units.
    async fn apply_line(
        &self,
        cart: &Cart,
        variant_id: VariantId,
        existing: u32,
        target: u32,
        record: &VariantRecord,
    ) -> Result<(), CartError> {
        if target == existing {
            return Ok(());
        }

        if target == 0 {
            self.store.delete_line(cart.id, variant_id).await?;
        } else {
            self.store
                .write_line(cart.id, variant_id, target, &record.snapshot)
                .await?;
        }

        Ok(())
    }

    async fn reload(&self, token: Uuid) -> Result<Cart, CartError> {
        self.store.find(token).await?.ok_or_else(|| {
            CartError::Repository(RepositoryError::DataCorruption(
                "cart disappeared during mutation".to_owned(),
            ))
        })
    }
}
