//! Database operations for the `teaware` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use teadb_core::{NormalizedTeaware, TeaType};
use uuid::Uuid;

use crate::{price_to_decimal, DbError, WriteOutcome};

/// A row from the `teaware` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeawareRow {
    pub id: i64,
    pub public_id: Uuid,
    pub company_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: String,
    pub material: String,
    pub clay_type: Option<String>,
    pub capacity_ml: Option<i32>,
    pub artisan_name: Option<String>,
    pub origin_region: Option<String>,
    pub price_usd: Option<Decimal>,
    pub product_url: Option<String>,
    pub in_stock: bool,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub recommended_teas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts a teaware item keyed on `slug`.
///
/// Stock, price, and images always reflect the latest scrape; descriptive
/// fields keep their stored value when the new record has none.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails, or
/// [`DbError::OutOfRange`] for a price that cannot be stored.
pub async fn upsert_teaware(
    pool: &PgPool,
    company_id: i64,
    item: &NormalizedTeaware,
) -> Result<WriteOutcome, DbError> {
    let price = price_to_decimal(item.price_usd)?;
    let recommended: Vec<&str> = item
        .recommended_teas
        .iter()
        .copied()
        .map(TeaType::as_str)
        .collect();

    let inserted: bool = sqlx::query_scalar(
        "INSERT INTO teaware \
             (company_id, name, slug, description, short_description, category, material, \
              clay_type, capacity_ml, artisan_name, origin_region, price_usd, product_url, \
              in_stock, image_url, images, recommended_teas) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
         ON CONFLICT (slug) DO UPDATE SET \
             company_id        = EXCLUDED.company_id, \
             name              = EXCLUDED.name, \
             description       = COALESCE(EXCLUDED.description, teaware.description), \
             short_description = COALESCE(EXCLUDED.short_description, teaware.short_description), \
             category          = EXCLUDED.category, \
             material          = EXCLUDED.material, \
             clay_type         = COALESCE(EXCLUDED.clay_type, teaware.clay_type), \
             capacity_ml       = COALESCE(EXCLUDED.capacity_ml, teaware.capacity_ml), \
             artisan_name      = COALESCE(EXCLUDED.artisan_name, teaware.artisan_name), \
             origin_region     = COALESCE(EXCLUDED.origin_region, teaware.origin_region), \
             price_usd         = COALESCE(EXCLUDED.price_usd, teaware.price_usd), \
             product_url       = COALESCE(EXCLUDED.product_url, teaware.product_url), \
             in_stock          = EXCLUDED.in_stock, \
             image_url         = COALESCE(EXCLUDED.image_url, teaware.image_url), \
             images            = EXCLUDED.images, \
             recommended_teas  = EXCLUDED.recommended_teas, \
             updated_at        = NOW() \
         RETURNING (xmax = 0)",
    )
    .bind(company_id)
    .bind(&item.name)
    .bind(&item.slug)
    .bind(&item.description)
    .bind(&item.short_description)
    .bind(item.category.as_str())
    .bind(item.material.as_str())
    .bind(item.clay_type.map(teadb_core::ClayType::as_str))
    .bind(item.capacity_ml)
    .bind(&item.artisan_name)
    .bind(&item.origin_region)
    .bind(price)
    .bind(&item.product_url)
    .bind(item.in_stock)
    .bind(&item.image_url)
    .bind(&item.images)
    .bind(&recommended)
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        WriteOutcome::Inserted
    } else {
        WriteOutcome::Updated
    })
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_teaware_by_slug(pool: &PgPool, slug: &str) -> Result<Option<TeawareRow>, DbError> {
    let row = sqlx::query_as::<_, TeawareRow>(
        "SELECT id, public_id, company_id, name, slug, description, short_description, \
                category, material, clay_type, capacity_ml, artisan_name, origin_region, \
                price_usd, product_url, in_stock, image_url, images, recommended_teas, \
                created_at, updated_at \
         FROM teaware \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
