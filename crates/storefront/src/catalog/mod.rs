//! Catalog view model.
//!
//! Domain types for products and collections as the rest of the storefront
//! consumes them, reshaped from relational rows by [`reshape`] and served
//! (with short-TTL caching) by [`service::CatalogService`].

pub mod reshape;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use madreselva_core::{CollectionId, Handle, Money, ProductId, VariantId};

/// Tag that removes a product from every public surface.
pub const HIDDEN_PRODUCT_TAG: &str = "madreselva-frontend-hidden";

/// Variant title used when a product has a single, unnamed variant.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Title";

// =============================================================================
// Product Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: String,
    /// Image width in pixels.
    pub width: i32,
    /// Image height in pixels.
    pub height: i32,
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Color", "Talla").
    pub name: String,
    /// Selected value (e.g., "Rosa", "M").
    pub value: String,
}

/// Product option definition, derived from the union of variant options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Talla").
    pub name: String,
    /// Available values (e.g., `["S", "M", "L"]`), in first-seen order.
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Current price.
    pub price: Money,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Units currently in stock. Cart quantities are clamped against this.
    pub inventory_quantity: i32,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

/// Price range for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// A product in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: Handle,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Product tags.
    pub tags: Vec<String>,
    /// Product options, derived from variant selected options.
    pub options: Vec<ProductOption>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A curated collection of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// URL handle. Handles starting with `hidden-` are internal curation.
    pub handle: Handle,
    /// Collection title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort keys for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortKey {
    /// Store order, unchanged.
    Relevance,
    /// Alphabetical title. There is no sales-count data in the catalog, so
    /// this is a documented relevance proxy, not a real sales ranking.
    BestSelling,
    /// Sort by creation date.
    CreatedAt,
    /// Sort by minimum variant price.
    Price,
}

impl SortKey {
    /// Resolve a URL sort slug into a sort key and direction.
    ///
    /// Unknown or absent slugs fall back to relevance (store order).
    #[must_use]
    pub fn from_slug(slug: Option<&str>) -> (Self, bool) {
        match slug {
            Some("trending-desc") => (Self::BestSelling, false),
            Some("latest-desc") => (Self::CreatedAt, true),
            Some("price-asc") => (Self::Price, false),
            Some("price-desc") => (Self::Price, true),
            _ => (Self::Relevance, false),
        }
    }
}

/// Sort products in place by the given key, optionally reversed.
///
/// `Relevance` preserves the incoming (store) order.
pub fn sort_products(products: &mut [Product], sort_key: SortKey, reverse: bool) {
    match sort_key {
        SortKey::Relevance => {}
        SortKey::BestSelling => products.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::CreatedAt => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Price => products.sort_by(|a, b| {
            a.price_range
                .min_variant_price
                .amount
                .cmp(&b.price_range.min_variant_price.amount)
        }),
    }

    if reverse {
        products.reverse();
    }
}

// =============================================================================
// Availability Policy
// =============================================================================

/// Which products appear in unfiltered/filtered listings.
///
/// Whether listings should include products with zero available variants is
/// a product decision, not a technical one, so it is a single configurable
/// predicate applied uniformly to every listing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityPolicy {
    /// List every product, sold out or not.
    All,
    /// List only products with at least one available variant.
    #[default]
    AvailableOnly,
}

/// Error parsing an [`AvailabilityPolicy`] from configuration.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown availability policy: {0} (expected \"all\" or \"available-only\")")]
pub struct AvailabilityPolicyError(pub String);

impl AvailabilityPolicy {
    /// Whether a product is listed under this policy.
    #[must_use]
    pub const fn is_listed(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::AvailableOnly => product.available_for_sale,
        }
    }
}

impl std::str::FromStr for AvailabilityPolicy {
    type Err = AvailabilityPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "available-only" => Ok(Self::AvailableOnly),
            other => Err(AvailabilityPolicyError(other.to_owned())),
        }
    }
}
