//! Collection route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use crate::catalog::{Collection, Product};
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::products::ListQuery;

/// Public collection listing, alphabetical, excluding hidden collections.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Collection>>> {
    let collections = state.catalog().collections().await?;
    Ok(Json(collections))
}

/// Collection detail by handle.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Collection>> {
    state
        .catalog()
        .collection_by_handle(&handle)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(handle))
}

/// Products in a collection, with the same query grammar as `/products`.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    // A collection that does not exist is a 404, not an empty listing.
    state
        .catalog()
        .collection_by_handle(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound(handle.clone()))?;

    let (sort_key, reverse) = query.sort();
    let products = state
        .catalog()
        .collection_products(&handle, sort_key, reverse, &query.filter())
        .await?;
    Ok(Json(products))
}
