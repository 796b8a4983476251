//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{Product, SortKey};
use crate::error::{AppError, Result};
use crate::search::ProductFilter;
use crate::state::AppState;

/// Listing query parameters shared by product and collection listings.
///
/// `color` and `size` take comma-separated facet values; `sort` takes the
/// URL slugs `trending-desc`, `latest-desc`, `price-asc`, `price-desc`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text query.
    pub q: Option<String>,
    /// Comma-separated color facet values.
    pub color: Option<String>,
    /// Comma-separated size facet values.
    pub size: Option<String>,
    /// Sort slug.
    pub sort: Option<String>,
}

impl ListQuery {
    /// The filter described by these parameters.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            query: self.q.clone(),
            colors: split_facet(self.color.as_deref()),
            sizes: split_facet(self.size.as_deref()),
        }
    }

    /// The sort key and direction described by these parameters.
    #[must_use]
    pub fn sort(&self) -> (SortKey, bool) {
        SortKey::from_slug(self.sort.as_deref())
    }
}

fn split_facet(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
    })
}

/// Product listing with optional free-text/facet filtering and sorting.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let (sort_key, reverse) = query.sort();
    let products = state
        .catalog()
        .products(&query.filter(), sort_key, reverse)
        .await?;
    Ok(Json(products))
}

/// Product detail by handle.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .product_by_handle(&handle)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(handle))
}

/// Same-collection recommendations for a product.
#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let product = state
        .catalog()
        .product_by_handle(&handle)
        .await?
        .ok_or(AppError::NotFound(handle))?;

    let recommended = state.catalog().recommendations(product.id).await?;
    Ok(Json(recommended))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_facet() {
        assert_eq!(
            split_facet(Some("rosa,negro")),
            vec!["rosa".to_owned(), "negro".to_owned()]
        );
        assert_eq!(split_facet(Some(" rosa , ,")), vec!["rosa".to_owned()]);
        assert!(split_facet(None).is_empty());
        assert!(split_facet(Some("")).is_empty());
    }

    #[test]
    fn test_list_query_filter() {
        let query = ListQuery {
            q: Some("saten".to_owned()),
            color: Some("rosa,negro".to_owned()),
            size: None,
            sort: Some("price-desc".to_owned()),
        };

        let filter = query.filter();
        assert_eq!(filter.query.as_deref(), Some("saten"));
        assert_eq!(filter.colors.len(), 2);
        assert!(filter.sizes.is_empty());

        assert_eq!(query.sort(), (SortKey::Price, true));
    }
}
