//! Postgres-backed cart persistence.
//!
//! One cart row per session token, one line row per (cart, variant). Each
//! mutation runs in its own transaction so a single read-then-write is
//! atomic; there is no cross-mutation locking, so concurrent writes to the
//! same line are last-write-wins by design.
//!
//! Lines store the product display snapshot frozen at creation (the
//! `ON CONFLICT` update touches only the quantity), while price,
//! availability, and inventory are joined live from `product_variants` on
//! every load.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use madreselva_core::{CartId, CurrencyCode, Handle, Money, VariantId};

use crate::cart::service::{CartStore, VariantRecord, VariantSource};
use crate::cart::{Cart, CartLine, DisplaySnapshot, VariantRef};
use crate::catalog::{Image, SelectedOption};

use super::RepositoryError;

/// A `carts` row.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
}

/// A `cart_lines` row joined with its live variant fields.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CartLineJoinRow {
    id: Uuid,
    variant_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    handle: String,
    title: String,
    variant_title: String,
    selected_options: Json<Vec<SelectedOption>>,
    image_url: Option<String>,
    image_alt: Option<String>,
    image_width: Option<i32>,
    image_height: Option<i32>,
    price: Decimal,
    currency_code: String,
    available_for_sale: bool,
    inventory_quantity: i32,
}

/// Joined row backing a [`VariantRecord`] lookup.
#[derive(Debug, Clone, sqlx::FromRow)]
struct VariantJoinRow {
    id: Uuid,
    title: String,
    price: Decimal,
    currency_code: String,
    available_for_sale: bool,
    inventory_quantity: i32,
    selected_options: Json<Vec<SelectedOption>>,
    product_id: Uuid,
    handle: String,
    product_title: String,
    image_url: Option<String>,
    image_alt: Option<String>,
    image_width: Option<i32>,
    image_height: Option<i32>,
}

fn parse_handle(raw: &str) -> Result<Handle, RepositoryError> {
    Handle::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid handle in database: {e}")))
}

fn parse_currency(raw: &str) -> Result<CurrencyCode, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid currency in database: {e}")))
}

fn parse_quantity(raw: i32) -> Result<u32, RepositoryError> {
    u32::try_from(raw)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative line quantity: {raw}")))
}

fn image_from_parts(
    url: Option<String>,
    alt: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    fallback_alt: &str,
) -> Option<Image> {
    url.map(|url| Image {
        url,
        alt_text: alt.unwrap_or_else(|| fallback_alt.to_owned()),
        width: width.unwrap_or(800),
        height: height.unwrap_or(600),
    })
}

/// Postgres implementation of [`CartStore`] and [`VariantSource`].
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
    default_currency: CurrencyCode,
}

impl PgCartStore {
    /// Create a new store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool, default_currency: CurrencyCode) -> Self {
        Self {
            pool,
            default_currency,
        }
    }

    async fn cart_row(&self, token: Uuid) -> Result<Option<CartRow>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id FROM carts WHERE session_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn assemble(&self, cart_id: Uuid) -> Result<Cart, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineJoinRow>(
            "SELECT cl.id, cl.variant_id, cl.quantity, cl.product_id, cl.handle, cl.title, \
                    cl.variant_title, cl.selected_options, cl.image_url, cl.image_alt, \
                    cl.image_width, cl.image_height, \
                    v.price, v.currency_code, v.available_for_sale, v.inventory_quantity \
             FROM cart_lines cl \
             JOIN product_variants v ON v.id = cl.variant_id \
             WHERE cl.cart_id = $1 \
             ORDER BY cl.created_at",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        let lines = rows
            .into_iter()
            .map(|row| {
                let currency = parse_currency(&row.currency_code)?;
                let featured_image = image_from_parts(
                    row.image_url,
                    row.image_alt,
                    row.image_width,
                    row.image_height,
                    &row.title,
                );

                Ok(CartLine {
                    id: row.id.into(),
                    quantity: parse_quantity(row.quantity)?,
                    variant: VariantRef {
                        id: row.variant_id.into(),
                        price: Money::new(row.price, currency),
                        available_for_sale: row.available_for_sale,
                        inventory_quantity: row.inventory_quantity,
                    },
                    snapshot: DisplaySnapshot {
                        product_id: row.product_id.into(),
                        handle: parse_handle(&row.handle)?,
                        title: row.title,
                        variant_title: row.variant_title,
                        selected_options: row.selected_options.0,
                        featured_image,
                    },
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Cart::assemble(
            CartId::new(cart_id),
            lines,
            self.default_currency,
        ))
    }
}

impl CartStore for PgCartStore {
    async fn find(&self, token: Uuid) -> Result<Option<Cart>, RepositoryError> {
        match self.cart_row(token).await? {
            Some(row) => Ok(Some(self.assemble(row.id).await?)),
            None => Ok(None),
        }
    }

    async fn find_or_create(&self, token: Uuid) -> Result<Cart, RepositoryError> {
        sqlx::query("INSERT INTO carts (session_token) VALUES ($1) ON CONFLICT (session_token) DO NOTHING")
            .bind(token)
            .execute(&self.pool)
            .await?;

        self.find(token).await?.ok_or_else(|| {
            RepositoryError::DataCorruption("cart missing immediately after creation".to_owned())
        })
    }

    async fn write_line(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: u32,
        snapshot: &DisplaySnapshot,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // The conflict arm updates the quantity only: the display snapshot
        // stays frozen at line creation.
        sqlx::query(
            "INSERT INTO cart_lines \
                 (cart_id, variant_id, quantity, product_id, handle, title, variant_title, \
                  selected_options, image_url, image_alt, image_width, image_height) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (cart_id, variant_id) \
             DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()",
        )
        .bind(cart_id.as_uuid())
        .bind(variant_id.as_uuid())
        .bind(i64::from(quantity))
        .bind(snapshot.product_id.as_uuid())
        .bind(snapshot.handle.as_str())
        .bind(&snapshot.title)
        .bind(&snapshot.variant_title)
        .bind(Json(&snapshot.selected_options))
        .bind(snapshot.featured_image.as_ref().map(|i| i.url.as_str()))
        .bind(snapshot.featured_image.as_ref().map(|i| i.alt_text.as_str()))
        .bind(snapshot.featured_image.as_ref().map(|i| i.width))
        .bind(snapshot.featured_image.as_ref().map(|i| i.height))
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE carts SET updated_at = now() WHERE id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_line(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1 AND variant_id = $2")
            .bind(cart_id.as_uuid())
            .bind(variant_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET updated_at = now() WHERE id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl VariantSource for PgCartStore {
    async fn variant(&self, id: VariantId) -> Result<Option<VariantRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, VariantJoinRow>(
            "SELECT v.id, v.title, v.price, v.currency_code, v.available_for_sale, \
                    v.inventory_quantity, v.selected_options, \
                    p.id AS product_id, p.handle, p.title AS product_title, \
                    img.url AS image_url, img.alt_text AS image_alt, \
                    img.width AS image_width, img.height AS image_height \
             FROM product_variants v \
             JOIN products p ON p.id = v.product_id \
             LEFT JOIN LATERAL ( \
                 SELECT url, alt_text, width, height \
                 FROM product_images i \
                 WHERE i.product_id = p.id \
                 ORDER BY i.is_featured DESC, i.url \
                 LIMIT 1 \
             ) img ON TRUE \
             WHERE v.id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let currency = parse_currency(&row.currency_code)?;
        let featured_image = image_from_parts(
            row.image_url,
            row.image_alt,
            row.image_width,
            row.image_height,
            &row.product_title,
        );

        Ok(Some(VariantRecord {
            variant: VariantRef {
                id: row.id.into(),
                price: Money::new(row.price, currency),
                available_for_sale: row.available_for_sale,
                inventory_quantity: row.inventory_quantity,
            },
            snapshot: DisplaySnapshot {
                product_id: row.product_id.into(),
                handle: parse_handle(&row.handle)?,
                title: row.product_title,
                variant_title: row.title,
                selected_options: row.selected_options.0,
                featured_image,
            },
        }))
    }
}
