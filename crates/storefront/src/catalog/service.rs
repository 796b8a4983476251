//! Catalog service: cached, reshaped reads over the catalog repository.
//!
//! All operations are pure reads with no side effects, so single-entity
//! lookups are memoized with a bounded 5-minute `moka` cache. Filtered
//! listings vary by query and are always read through.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rand::seq::SliceRandom;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use madreselva_core::{CurrencyCode, ProductId};

use crate::db::RepositoryError;
use crate::db::catalog::{CatalogRepository, ImageRow, ProductRow, VariantRow};
use crate::search::{self, ProductFilter};

use super::{AvailabilityPolicy, Collection, Product, SortKey, reshape, sort_products};

/// Maximum number of products returned by recommendations.
const MAX_RECOMMENDATIONS: usize = 4;

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Collection(Box<Collection>),
    Collections(Arc<Vec<Collection>>),
}

/// Cached catalog reads.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<String, CacheValue>,
    default_currency: CurrencyCode,
    availability: AvailabilityPolicy,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(
        pool: PgPool,
        default_currency: CurrencyCode,
        availability: AvailabilityPolicy,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                pool,
                cache,
                default_currency,
                availability,
            }),
        }
    }

    fn repo(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(&self.inner.pool)
    }

    /// Reshape a batch of product rows, fetching their variants and images
    /// in two grouped queries. Hidden products are dropped.
    async fn assemble_products(
        &self,
        rows: Vec<ProductRow>,
    ) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let repo = self.repo();

        let mut variants_by_product: HashMap<Uuid, Vec<VariantRow>> = HashMap::new();
        for variant in repo.variants_for(&ids).await? {
            variants_by_product
                .entry(variant.product_id)
                .or_default()
                .push(variant);
        }

        let mut images_by_product: HashMap<Uuid, Vec<ImageRow>> = HashMap::new();
        for image in repo.images_for(&ids).await? {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let variants = variants_by_product.remove(&row.id).unwrap_or_default();
            let images = images_by_product.remove(&row.id).unwrap_or_default();
            if let Some(product) =
                reshape::product(row, variants, images, self.inner.default_currency)?
            {
                products.push(product);
            }
        }

        Ok(products)
    }

    /// Get a product by its unique handle, with variants and images.
    ///
    /// Returns `Ok(None)` when no product matches (or the product is
    /// hidden); only infrastructure failures are errors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let cache_key = format!("product:{handle}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(row) = self.repo().product_by_handle(handle).await? else {
            return Ok(None);
        };

        let products = self.assemble_products(vec![row]).await?;
        let Some(product) = products.into_iter().next() else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Products matching an optional free-text/facet filter, sorted.
    ///
    /// The configured availability policy is applied uniformly before
    /// filtering.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self, filter))]
    pub async fn products(
        &self,
        filter: &ProductFilter,
        sort_key: SortKey,
        reverse: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = self.repo().all_products().await?;
        let products = self.assemble_products(rows).await?;

        let listed = products
            .into_iter()
            .filter(|p| self.inner.availability.is_listed(p))
            .collect();

        let mut matched = search::filter_products(listed, filter);
        sort_products(&mut matched, sort_key, reverse);
        Ok(matched)
    }

    /// Get a collection by its unique handle.
    ///
    /// Hidden collections resolve here too - they are curation inputs for
    /// internal surfaces, just excluded from public listings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn collection_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<Collection>, RepositoryError> {
        let cache_key = format!("collection:{handle}");

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(Some(*collection));
        }

        let Some(row) = self.repo().collection_by_handle(handle).await? else {
            return Ok(None);
        };

        let collection = reshape::collection(row)?;
        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(Some(collection))
    }

    /// All public collections, alphabetical by title.
    ///
    /// Collections whose handle starts with `hidden-` are internal curation
    /// and never listed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn collections(&self) -> Result<Vec<Collection>, RepositoryError> {
        const CACHE_KEY: &str = "collections";

        if let Some(CacheValue::Collections(collections)) =
            self.inner.cache.get(CACHE_KEY).await
        {
            debug!("Cache hit for collections");
            return Ok(collections.as_ref().clone());
        }

        let collections = self
            .repo()
            .all_collections()
            .await?
            .into_iter()
            .map(reshape::collection)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|c| !c.handle.is_hidden())
            .collect::<Vec<_>>();

        self.inner
            .cache
            .insert(
                CACHE_KEY.to_owned(),
                CacheValue::Collections(Arc::new(collections.clone())),
            )
            .await;

        Ok(collections)
    }

    /// Products in a collection, filtered and sorted.
    ///
    /// `SortKey::Relevance` preserves store order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self, filter), fields(handle = %handle))]
    pub async fn collection_products(
        &self,
        handle: &str,
        sort_key: SortKey,
        reverse: bool,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = self.repo().products_in_collection(handle).await?;
        let products = self.assemble_products(rows).await?;

        let listed = products
            .into_iter()
            .filter(|p| self.inner.availability.is_listed(p))
            .collect();

        let mut matched = search::filter_products(listed, filter);
        sort_products(&mut matched, sort_key, reverse);
        Ok(matched)
    }

    /// Up to four available products sharing a collection with the given
    /// product, excluding the product itself.
    ///
    /// Selection among ties is randomized; callers must not depend on any
    /// ordering beyond "same collection, available, excludes self".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unreachable.
    #[instrument(skip(self))]
    pub async fn recommendations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = self.repo().related_products(product_id.as_uuid()).await?;
        let products = self.assemble_products(rows).await?;

        let mut available: Vec<Product> = products
            .into_iter()
            .filter(|p| p.available_for_sale)
            .collect();

        available.shuffle(&mut rand::rng());
        available.truncate(MAX_RECOMMENDATIONS);
        Ok(available)
    }
}
