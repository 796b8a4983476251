//! Demo catalog seeding.
//!
//! Inserts a small catalog of collections, products, variants, and images,
//! including the `hidden-homepage-*` curation collections used by internal
//! surfaces. Re-running upserts by handle, so the command is idempotent.

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CommandError, connect};

struct SeedVariant {
    color: &'static str,
    talla: &'static str,
    price: Decimal,
    inventory: i32,
}

struct SeedProduct {
    handle: &'static str,
    title: &'static str,
    description: &'static str,
    image_url: &'static str,
    collections: &'static [&'static str],
    variants: &'static [(&'static str, &'static [&'static str], i64, i32)],
}

const COLLECTIONS: &[(&str, &str, &str)] = &[
    (
        "pijamas-largos",
        "Pijamas Largos",
        "Pijamas de manga larga para noches frescas",
    ),
    (
        "pijamas-cortos",
        "Pijamas Cortos",
        "Pijamas frescos para el verano",
    ),
    (
        "pijamas-saten",
        "Pijamas de Satén",
        "Satén suave para un descanso de lujo",
    ),
    ("hidden-homepage-featured-items", "Destacados", ""),
    ("hidden-homepage-carousel", "Carrusel", ""),
];

/// (color, tallas, price, inventory per talla)
const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        handle: "pijama-saten-rosa",
        title: "Pijama Satén Rosa",
        description: "Pijama de satén rosado con detalles en encaje",
        image_url: "https://images.madreselva.com.ar/pijama-saten-rosa.jpg",
        collections: &[
            "pijamas-largos",
            "pijamas-saten",
            "hidden-homepage-featured-items",
        ],
        variants: &[("rosado", &["S", "M", "L"], 79_999, 8)],
    },
    SeedProduct {
        handle: "pijama-saten-negro",
        title: "Pijama Satén Negro",
        description: "Pijama de satén negro, clásico y elegante",
        image_url: "https://images.madreselva.com.ar/pijama-saten-negro.jpg",
        collections: &[
            "pijamas-largos",
            "pijamas-saten",
            "hidden-homepage-carousel",
        ],
        variants: &[("negro", &["S", "M", "L", "XL"], 84_999, 5)],
    },
    SeedProduct {
        handle: "pijama-corto-celeste",
        title: "Pijama Corto Celeste",
        description: "Conjunto corto celeste de algodón peinado",
        image_url: "https://images.madreselva.com.ar/pijama-corto-celeste.jpg",
        collections: &["pijamas-cortos", "hidden-homepage-featured-items"],
        variants: &[("celeste", &["XS", "S", "M"], 64_999, 12)],
    },
    SeedProduct {
        handle: "pijama-lino-blanco",
        title: "Pijama Lino Blanco",
        description: "Pijama de lino blanco, liviano y natural",
        image_url: "https://images.madreselva.com.ar/pijama-lino-blanco.jpg",
        collections: &["pijamas-largos"],
        variants: &[("blanco", &["M", "L"], 89_999, 3)],
    },
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run(clear: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    if clear {
        clear_catalog(&pool).await?;
    }

    for (handle, title, description) in COLLECTIONS {
        upsert_collection(&pool, handle, title, description).await?;
    }
    tracing::info!(count = COLLECTIONS.len(), "Collections seeded");

    for product in PRODUCTS {
        seed_product(&pool, product).await?;
    }
    tracing::info!(count = PRODUCTS.len(), "Products seeded");

    Ok(())
}

async fn clear_catalog(pool: &PgPool) -> Result<(), CommandError> {
    tracing::info!("Clearing existing catalog...");
    sqlx::query(
        "TRUNCATE product_collections, product_images, product_variants, products, collections \
         CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_collection(
    pool: &PgPool,
    handle: &str,
    title: &str,
    description: &str,
) -> Result<Uuid, CommandError> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO collections (handle, title, description) VALUES ($1, $2, $3) \
         ON CONFLICT (handle) DO UPDATE SET title = EXCLUDED.title, \
             description = EXCLUDED.description, updated_at = now() \
         RETURNING id",
    )
    .bind(handle)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_product(pool: &PgPool, product: &SeedProduct) -> Result<(), CommandError> {
    let (product_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO products (handle, title, description, description_html) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (handle) DO UPDATE SET title = EXCLUDED.title, \
             description = EXCLUDED.description, \
             description_html = EXCLUDED.description_html, updated_at = now() \
         RETURNING id",
    )
    .bind(product.handle)
    .bind(product.title)
    .bind(product.description)
    .bind(format!("<p>{}</p>", product.description))
    .fetch_one(pool)
    .await?;

    // Variants are replaced wholesale so tallas and stock stay in sync.
    sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    for &(color, tallas, price, inventory) in product.variants {
        for &talla in tallas {
            let variant = SeedVariant {
                color,
                talla,
                price: Decimal::new(price, 0),
                inventory,
            };
            insert_variant(pool, product_id, &variant).await?;
        }
    }

    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    sqlx::query(
        "INSERT INTO product_images (product_id, url, alt_text, width, height, is_featured) \
         VALUES ($1, $2, $3, 800, 1000, TRUE)",
    )
    .bind(product_id)
    .bind(product.image_url)
    .bind(product.title)
    .execute(pool)
    .await?;

    for collection_handle in product.collections {
        sqlx::query(
            "INSERT INTO product_collections (product_id, collection_id) \
             SELECT $1, id FROM collections WHERE handle = $2 \
             ON CONFLICT (product_id, collection_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(collection_handle)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn insert_variant(
    pool: &PgPool,
    product_id: Uuid,
    variant: &SeedVariant,
) -> Result<(), CommandError> {
    let selected_options = json!([
        { "name": "Color", "value": variant.color },
        { "name": "Talla", "value": variant.talla },
    ]);

    sqlx::query(
        "INSERT INTO product_variants \
             (product_id, title, price, currency_code, available_for_sale, \
              inventory_quantity, selected_options) \
         VALUES ($1, $2, $3, 'ARS', $4, $5, $6)",
    )
    .bind(product_id)
    .bind(format!("{} / {}", variant.color, variant.talla))
    .bind(variant.price)
    .bind(variant.inventory > 0)
    .bind(variant.inventory)
    .bind(&selected_options)
    .execute(pool)
    .await?;

    Ok(())
}
