//! Reshaping relational rows into the catalog view model.
//!
//! Everything derived on [`Product`] - the option space, the price range,
//! the availability flag, the featured image - is computed here from the
//! child rows, never trusted from a stored aggregate.

use madreselva_core::{CurrencyCode, Handle, Money};

use crate::db::RepositoryError;
use crate::db::catalog::{CollectionRow, ImageRow, ProductRow, VariantRow};

use super::{
    Collection, HIDDEN_PRODUCT_TAG, Image, PriceRange, Product, ProductOption, ProductVariant,
};

fn parse_handle(raw: &str) -> Result<Handle, RepositoryError> {
    Handle::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid handle in database: {e}")))
}

fn parse_currency(raw: &str) -> Result<CurrencyCode, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid currency in database: {e}")))
}

/// Derive the product option space from the union of variant selected options.
///
/// Option names and values keep first-seen order; values are deduplicated.
#[must_use]
pub fn options_union(variants: &[ProductVariant]) -> Vec<ProductOption> {
    let mut options: Vec<ProductOption> = Vec::new();

    for variant in variants {
        for selected in &variant.selected_options {
            match options.iter_mut().find(|o| o.name == selected.name) {
                Some(option) => {
                    if !option.values.contains(&selected.value) {
                        option.values.push(selected.value.clone());
                    }
                }
                None => options.push(ProductOption {
                    name: selected.name.clone(),
                    values: vec![selected.value.clone()],
                }),
            }
        }
    }

    options
}

/// Reshape a product row plus its variant and image rows into a [`Product`].
///
/// Returns `Ok(None)` for products carrying the hidden tag; they never leave
/// the adapter.
///
/// # Errors
///
/// Returns [`RepositoryError::DataCorruption`] when a stored handle or
/// currency code fails to parse.
pub fn product(
    row: ProductRow,
    variant_rows: Vec<VariantRow>,
    image_rows: Vec<ImageRow>,
    default_currency: CurrencyCode,
) -> Result<Option<Product>, RepositoryError> {
    if row.tags.iter().any(|t| t == HIDDEN_PRODUCT_TAG) {
        return Ok(None);
    }

    let handle = parse_handle(&row.handle)?;

    let variants = variant_rows
        .into_iter()
        .map(|v| {
            let currency = parse_currency(&v.currency_code)?;
            Ok(ProductVariant {
                id: v.id.into(),
                title: v.title,
                price: Money::new(v.price, currency),
                available_for_sale: v.available_for_sale,
                inventory_quantity: v.inventory_quantity,
                selected_options: v.selected_options.0,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    // Featured image is the flagged row, falling back to the first image.
    let featured_index = image_rows
        .iter()
        .position(|i| i.is_featured)
        .unwrap_or(0);

    let images: Vec<Image> = image_rows
        .into_iter()
        .map(|i| Image {
            url: i.url,
            alt_text: i.alt_text.unwrap_or_else(|| row.title.clone()),
            width: i.width,
            height: i.height,
        })
        .collect();

    let featured_image = images.get(featured_index).cloned();

    let range_currency = variants
        .first()
        .map_or(default_currency, |v| v.price.currency_code);
    let min_amount = variants
        .iter()
        .map(|v| v.price.amount)
        .min()
        .unwrap_or_default();
    let max_amount = variants
        .iter()
        .map(|v| v.price.amount)
        .max()
        .unwrap_or_default();

    let options = options_union(&variants);

    // A product is purchasable only while the master flag is on and at least
    // one variant remains available.
    let available_for_sale =
        row.available_for_sale && variants.iter().any(|v| v.available_for_sale);

    Ok(Some(Product {
        id: row.id.into(),
        handle,
        title: row.title,
        description: row.description,
        description_html: row.description_html,
        available_for_sale,
        tags: row.tags,
        options,
        price_range: PriceRange {
            min_variant_price: Money::new(min_amount, range_currency),
            max_variant_price: Money::new(max_amount, range_currency),
        },
        featured_image,
        images,
        variants,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Reshape a collection row into a [`Collection`].
///
/// # Errors
///
/// Returns [`RepositoryError::DataCorruption`] when the stored handle fails
/// to parse.
pub fn collection(row: CollectionRow) -> Result<Collection, RepositoryError> {
    Ok(Collection {
        id: row.id.into(),
        handle: parse_handle(&row.handle)?,
        title: row.title,
        description: row.description.unwrap_or_default(),
        updated_at: row.updated_at,
    })
}
