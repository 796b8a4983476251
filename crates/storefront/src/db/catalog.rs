//! Catalog repository: relational rows for products and collections.
//!
//! Pure row fetching - reshaping into the view model happens in
//! [`crate::catalog::reshape`]. Lookups that match zero rows return
//! `Ok(None)`/empty vectors; only infrastructure failures surface as errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::catalog::SelectedOption;

use super::RepositoryError;

/// A `products` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    pub available_for_sale: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `product_variants` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub currency_code: String,
    pub available_for_sale: bool,
    pub inventory_quantity: i32,
    pub selected_options: Json<Vec<SelectedOption>>,
}

/// A `product_images` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: i32,
    pub height: i32,
    pub is_featured: bool,
}

/// A `collections` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRow {
    pub id: Uuid,
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str =
    "id, handle, title, description, description_html, available_for_sale, tags, \
     created_at, updated_at";

const VARIANT_COLUMNS: &str =
    "id, product_id, title, price, currency_code, available_for_sale, inventory_quantity, \
     selected_options";

/// Repository for catalog row fetching.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product row by its unique handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<ProductRow>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE handle = $1"
        ))
        .bind(handle)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// All product rows in store (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_products(&self) -> Result<Vec<ProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Variant rows for a set of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variants_for(
        &self,
        product_ids: &[Uuid],
    ) -> Result<Vec<VariantRow>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants \
             WHERE product_id = ANY($1) ORDER BY title"
        ))
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Image rows for a set of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images_for(&self, product_ids: &[Uuid]) -> Result<Vec<ImageRow>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, product_id, url, alt_text, width, height, is_featured \
             FROM product_images WHERE product_id = ANY($1) ORDER BY url",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a collection row by its unique handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<CollectionRow>, RepositoryError> {
        let row = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, handle, title, description, created_at, updated_at \
             FROM collections WHERE handle = $1",
        )
        .bind(handle)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// All collection rows, alphabetical by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_collections(&self) -> Result<Vec<CollectionRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, handle, title, description, created_at, updated_at \
             FROM collections ORDER BY title",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Product rows belonging to a collection, in store order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_in_collection(
        &self,
        handle: &str,
    ) -> Result<Vec<ProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT p.id, p.handle, p.title, p.description, p.description_html, \
                    p.available_for_sale, p.tags, p.created_at, p.updated_at \
             FROM products p \
             JOIN product_collections pc ON pc.product_id = p.id \
             JOIN collections c ON c.id = pc.collection_id \
             WHERE c.handle = $1 \
             ORDER BY p.created_at",
        )
        .bind(handle)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Product rows sharing at least one collection with the given product,
    /// excluding the product itself.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related_products(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ProductRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT DISTINCT p.id, p.handle, p.title, p.description, p.description_html, \
                    p.available_for_sale, p.tags, p.created_at, p.updated_at \
             FROM products p \
             JOIN product_collections pc ON pc.product_id = p.id \
             WHERE pc.collection_id IN ( \
                 SELECT collection_id FROM product_collections WHERE product_id = $1 \
             ) \
             AND p.id <> $1",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
