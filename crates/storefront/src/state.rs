//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::service::CartService;
use crate::catalog::service::CatalogService;
use crate::checkout::CheckoutHandoff;
use crate::config::StorefrontConfig;
use crate::db::carts::PgCartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogService,
    carts: CartService<PgCartStore, PgCartStore>,
    checkout: CheckoutHandoff,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogService::new(
            pool.clone(),
            config.default_currency,
            config.availability,
        );
        let store = PgCartStore::new(pool.clone(), config.default_currency);
        let carts = CartService::new(store.clone(), store, config.default_currency);
        let checkout = CheckoutHandoff::new(config.store_name.clone(), config.whatsapp_phone.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                carts,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService<PgCartStore, PgCartStore> {
        &self.inner.carts
    }

    /// Get a reference to the checkout handoff builder.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutHandoff {
        &self.inner.checkout
    }
}
