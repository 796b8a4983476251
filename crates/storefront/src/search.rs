//! Search term expansion and product filtering.
//!
//! Shoppers search in Spanish, English, and colloquial mixes of both
//! ("rosita", "talle m"), while the catalog stores canonical option values.
//! One static synonym table per facet dimension maps any declared spelling
//! onto its group; [`expand`] applies one level of that mapping and
//! [`filter_products`] matches the expanded terms against the catalog.
//!
//! Matching semantics: terms within one dimension are OR'd, dimensions
//! (text query, color, size) are AND'd, and a non-empty dimension that
//! matches nothing yields zero results overall - a filter is never silently
//! ignored.

use std::collections::BTreeSet;

use crate::catalog::Product;

/// Option name carrying color values on variants.
pub const COLOR_OPTION: &str = "Color";

/// Option name carrying size values on variants.
pub const SIZE_OPTION: &str = "Talla";

/// Color synonym groups. Every member of a group expands to the full group.
const COLOR_GROUPS: &[&[&str]] = &[
    &["rosa", "rosado", "pink", "rosita"],
    &["azul", "blue", "celeste", "turquesa"],
    &["negro", "negra", "black", "oscuro", "oscura"],
    &["blanco", "blanca", "white", "claro", "clara"],
    &["rojo", "roja", "red", "carmesí", "carmesi"],
    &["verde", "green", "esmeralda"],
    &["amarillo", "amarilla", "yellow", "dorado", "dorada"],
    &["morado", "morada", "purple", "violeta", "lila"],
    &["gris", "gray", "grey", "plata", "plateado"],
];

/// Size phrases mapped onto canonical size codes.
const SIZE_RULES: &[(&str, &[&str])] = &[
    ("chico", &["S", "XS"]),
    ("pequeño", &["S", "XS"]),
    ("pequeña", &["S", "XS"]),
    ("small", &["S", "XS"]),
    ("xs", &["XS"]),
    ("extra small", &["XS"]),
    ("extra pequeña", &["XS"]),
    ("talle s", &["S"]),
    ("talla s", &["S"]),
    ("mediano", &["M"]),
    ("mediana", &["M"]),
    ("medium", &["M"]),
    ("talle m", &["M"]),
    ("talla m", &["M"]),
    ("grande", &["L", "XL"]),
    ("large", &["L", "XL"]),
    ("talle l", &["L"]),
    ("talla l", &["L"]),
    ("xl", &["XL"]),
    ("extra grande", &["XL"]),
    ("extra large", &["XL"]),
    ("talle xl", &["XL"]),
    ("talla xl", &["XL"]),
];

/// Expand a raw user-entered term into the set of terms to OR-match.
///
/// The result always contains the original term verbatim, plus every term
/// declared as a synonym in the color and size tables. Lookup is
/// case-insensitive and one level deep - no transitive closure beyond the
/// declared group.
#[must_use]
pub fn expand(term: &str) -> BTreeSet<String> {
    let lower = term.trim().to_lowercase();

    let mut expanded = BTreeSet::new();
    expanded.insert(term.to_owned());

    for group in COLOR_GROUPS {
        if group.contains(&lower.as_str()) {
            expanded.extend(group.iter().map(|s| (*s).to_owned()));
        }
    }

    for (phrase, sizes) in SIZE_RULES {
        if *phrase == lower {
            expanded.extend(sizes.iter().map(|s| (*s).to_owned()));
        }
    }

    expanded
}

/// A product listing filter: free-text query plus color/size facet values.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Free-text query matched against titles, descriptions, and options.
    pub query: Option<String>,
    /// Selected color facet values.
    pub colors: Vec<String>,
    /// Selected size facet values.
    pub sizes: Vec<String>,
}

impl ProductFilter {
    /// Whether no dimension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.as_deref().is_none_or(|q| q.trim().is_empty())
            && self.colors.is_empty()
            && self.sizes.is_empty()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A free-text term matches when any expansion appears as a substring of the
/// title or description, or exactly equals a variant option value.
fn text_term_matches(product: &Product, term: &str) -> bool {
    expand(term).iter().any(|t| {
        contains_ignore_case(&product.title, t)
            || contains_ignore_case(&product.description, t)
            || product.variants.iter().any(|v| {
                v.selected_options
                    .iter()
                    .any(|o| o.value.eq_ignore_ascii_case(t))
            })
    })
}

/// A facet term matches when any expansion equals a variant's value for the
/// given option name.
fn facet_term_matches(product: &Product, option_name: &str, term: &str) -> bool {
    expand(term).iter().any(|t| {
        product.variants.iter().any(|v| {
            v.selected_options.iter().any(|o| {
                o.name.eq_ignore_ascii_case(option_name) && o.value.eq_ignore_ascii_case(t)
            })
        })
    })
}

/// Whether a product satisfies every dimension of the filter.
#[must_use]
pub fn matches(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(query) = filter.query.as_deref() {
        let query = query.trim();
        if !query.is_empty() && !text_term_matches(product, query) {
            return false;
        }
    }

    if !filter.colors.is_empty()
        && !filter
            .colors
            .iter()
            .any(|c| facet_term_matches(product, COLOR_OPTION, c))
    {
        return false;
    }

    if !filter.sizes.is_empty()
        && !filter
            .sizes
            .iter()
            .any(|s| facet_term_matches(product, SIZE_OPTION, s))
    {
        return false;
    }

    true
}

/// Keep only the products satisfying the filter.
#[must_use]
pub fn filter_products(products: Vec<Product>, filter: &ProductFilter) -> Vec<Product> {
    if filter.is_empty() {
        return products;
    }
    products.into_iter().filter(|p| matches(p, filter)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use madreselva_core::{CurrencyCode, Handle, Money, ProductId, VariantId};

    use crate::catalog::{PriceRange, ProductVariant, SelectedOption};

    use super::*;

    fn seeded_product(handle: &str, title: &str, options: Vec<(&str, &str)>) -> Product {
        let price = Money::new(Decimal::new(79_999, 0), CurrencyCode::ARS);
        Product {
            id: ProductId::generate(),
            handle: Handle::parse(handle).unwrap(),
            title: title.to_owned(),
            description: format!("{title} de satén para dormir"),
            description_html: String::new(),
            available_for_sale: true,
            tags: Vec::new(),
            options: Vec::new(),
            price_range: PriceRange {
                min_variant_price: price,
                max_variant_price: price,
            },
            featured_image: None,
            images: Vec::new(),
            variants: vec![ProductVariant {
                id: VariantId::generate(),
                title: "Variant".to_owned(),
                price,
                available_for_sale: true,
                inventory_quantity: 5,
                selected_options: options
                    .into_iter()
                    .map(|(name, value)| SelectedOption {
                        name: name.to_owned(),
                        value: value.to_owned(),
                    })
                    .collect(),
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn seeded_catalog() -> Vec<Product> {
        vec![
            seeded_product(
                "pijama-rosado",
                "Pijama Rosado",
                vec![("Color", "rosado"), ("Talla", "S")],
            ),
            seeded_product(
                "pijama-negro",
                "Pijama Negro",
                vec![("Color", "negro"), ("Talla", "M")],
            ),
            seeded_product(
                "pijama-celeste",
                "Pijama Celeste",
                vec![("Color", "celeste"), ("Talla", "XL")],
            ),
        ]
    }

    fn handles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.handle.as_str()).collect()
    }

    #[test]
    fn test_expand_includes_original_verbatim() {
        let expanded = expand("Rosa");
        assert!(expanded.contains("Rosa"));
        assert!(expanded.contains("rosado"));
        assert!(expanded.contains("pink"));
        assert!(expanded.contains("rosita"));
    }

    #[test]
    fn test_expand_sizes() {
        let expanded = expand("chico");
        assert!(expanded.contains("S"));
        assert!(expanded.contains("XS"));

        let expanded = expand("talla m");
        assert!(expanded.contains("M"));
        assert!(!expanded.contains("L"));
    }

    #[test]
    fn test_expand_unknown_term_is_just_itself() {
        let expanded = expand("fucsia");
        assert_eq!(expanded.len(), 1);
        assert!(expanded.contains("fucsia"));
    }

    #[test]
    fn test_color_synonyms_match_same_set() {
        let catalog = seeded_catalog();

        for term in ["rosa", "rosado", "pink"] {
            let filter = ProductFilter {
                colors: vec![term.to_owned()],
                ..ProductFilter::default()
            };
            let found = filter_products(catalog.clone(), &filter);
            assert_eq!(handles(&found), vec!["pijama-rosado"], "term {term}");
        }
    }

    #[test]
    fn test_facet_matching_is_case_insensitive() {
        let catalog = seeded_catalog();
        let filter = ProductFilter {
            colors: vec!["ROSA".to_owned()],
            ..ProductFilter::default()
        };
        assert_eq!(handles(&filter_products(catalog, &filter)), vec!["pijama-rosado"]);
    }

    #[test]
    fn test_dimensions_are_anded() {
        let catalog = seeded_catalog();

        // Color matches the rosado product, size does not.
        let filter = ProductFilter {
            colors: vec!["rosa".to_owned()],
            sizes: vec!["grande".to_owned()],
            ..ProductFilter::default()
        };
        assert!(filter_products(catalog.clone(), &filter).is_empty());

        // Both dimensions match.
        let filter = ProductFilter {
            colors: vec!["rosa".to_owned()],
            sizes: vec!["chico".to_owned()],
            ..ProductFilter::default()
        };
        assert_eq!(handles(&filter_products(catalog, &filter)), vec!["pijama-rosado"]);
    }

    #[test]
    fn test_terms_within_dimension_are_ored() {
        let catalog = seeded_catalog();
        let filter = ProductFilter {
            colors: vec!["rosa".to_owned(), "negro".to_owned()],
            ..ProductFilter::default()
        };
        let found = filter_products(catalog, &filter);
        assert_eq!(handles(&found), vec!["pijama-rosado", "pijama-negro"]);
    }

    #[test]
    fn test_unmatched_dimension_short_circuits_to_empty() {
        let catalog = seeded_catalog();
        let filter = ProductFilter {
            query: Some("pijama".to_owned()),
            colors: vec!["fucsia".to_owned()],
            ..ProductFilter::default()
        };
        assert!(filter_products(catalog, &filter).is_empty());
    }

    #[test]
    fn test_text_query_matches_title_substring() {
        let catalog = seeded_catalog();
        let filter = ProductFilter {
            query: Some("CELESTE".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(handles(&filter_products(catalog, &filter)), vec!["pijama-celeste"]);
    }

    #[test]
    fn test_text_query_expands_synonyms() {
        let catalog = seeded_catalog();
        // "azul" never appears literally, but expands to "celeste".
        let filter = ProductFilter {
            query: Some("azul".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(handles(&filter_products(catalog, &filter)), vec!["pijama-celeste"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let catalog = seeded_catalog();
        let filter = ProductFilter {
            query: Some("   ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter_products(catalog, &filter).len(), 3);
    }
}
