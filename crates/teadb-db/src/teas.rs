//! Database operations for the `teas` table.
//!
//! Dedup is entirely the unique index on `(company_id, name_key)`: there is
//! no existence pre-check, so concurrent writers cannot both insert the same
//! tea. The key is bound from [`teadb_core::name_key`], so the audit's
//! in-memory comparison and the index agree by construction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use teadb_core::NormalizedTea;
use uuid::Uuid;

use crate::{price_to_decimal, DbError, UpsertMode, WriteOutcome};

/// A row from the `teas` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeaRow {
    pub id: i64,
    pub public_id: Uuid,
    pub company_id: Option<i64>,
    pub name: String,
    pub name_key: String,
    pub brand_name: String,
    pub tea_type: String,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub steep_temp_f: Option<i32>,
    pub steep_time_min: Option<i32>,
    pub steep_time_max: Option<i32>,
    pub flavor_notes: Vec<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub price_usd: Option<Decimal>,
    pub source_product_id: Option<String>,
    pub avg_rating: Decimal,
    pub rating_count: i32,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const INSERT_TEA: &str = "INSERT INTO teas \
         (company_id, name, name_key, brand_name, tea_type, description, origin, \
          steep_temp_f, steep_time_min, steep_time_max, flavor_notes, \
          image_url, product_url, price_usd, source_product_id, is_custom) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, false) ";

/// Writes one normalized tea for `company_id`.
///
/// In [`UpsertMode::Skip`] an existing `(company, name_key)` row is left
/// untouched. In [`UpsertMode::Update`] its catalog fields are overwritten;
/// nullable fields keep their stored value when the new record has none,
/// and ratings and `is_custom` are never touched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails, or
/// [`DbError::OutOfRange`] for a price that cannot be stored.
pub async fn upsert_tea(
    pool: &PgPool,
    company_id: i64,
    tea: &NormalizedTea,
    mode: UpsertMode,
) -> Result<WriteOutcome, DbError> {
    let price = price_to_decimal(tea.price_usd)?;

    let conflict = match mode {
        UpsertMode::Skip => "ON CONFLICT (company_id, name_key) DO NOTHING RETURNING true",
        UpsertMode::Update => {
            "ON CONFLICT (company_id, name_key) DO UPDATE SET \
                 brand_name        = EXCLUDED.brand_name, \
                 tea_type          = EXCLUDED.tea_type, \
                 description       = COALESCE(EXCLUDED.description, teas.description), \
                 origin            = COALESCE(EXCLUDED.origin, teas.origin), \
                 steep_temp_f      = EXCLUDED.steep_temp_f, \
                 steep_time_min    = EXCLUDED.steep_time_min, \
                 steep_time_max    = EXCLUDED.steep_time_max, \
                 flavor_notes      = CASE WHEN cardinality(EXCLUDED.flavor_notes) > 0 \
                                          THEN EXCLUDED.flavor_notes ELSE teas.flavor_notes END, \
                 image_url         = COALESCE(EXCLUDED.image_url, teas.image_url), \
                 product_url       = COALESCE(EXCLUDED.product_url, teas.product_url), \
                 price_usd         = COALESCE(EXCLUDED.price_usd, teas.price_usd), \
                 source_product_id = COALESCE(EXCLUDED.source_product_id, teas.source_product_id), \
                 updated_at        = NOW() \
             RETURNING (xmax = 0)"
        }
    };

    let inserted: Option<bool> = sqlx::query_scalar(&format!("{INSERT_TEA}{conflict}"))
        .bind(company_id)
        .bind(tea.name.trim())
        .bind(tea.name_key())
        .bind(&tea.brand_name)
        .bind(tea.tea_type.as_str())
        .bind(&tea.description)
        .bind(&tea.origin)
        .bind(tea.steeping.temp_f)
        .bind(tea.steeping.time_min_minutes)
        .bind(tea.steeping.time_max_minutes)
        .bind(&tea.flavor_notes)
        .bind(&tea.image_url)
        .bind(&tea.product_url)
        .bind(price)
        .bind(&tea.source_product_id)
        .fetch_optional(pool)
        .await?;

    // Skip mode returns no row on conflict; update mode reports whether the
    // row version is fresh (xmax = 0) or the product of an update.
    Ok(match inserted {
        None => WriteOutcome::Skipped,
        Some(true) => WriteOutcome::Inserted,
        Some(false) => WriteOutcome::Updated,
    })
}

/// Stored name keys for a company's teas, sorted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tea_name_keys(pool: &PgPool, company_id: i64) -> Result<Vec<String>, DbError> {
    let keys = sqlx::query_scalar::<_, String>(
        "SELECT name_key FROM teas WHERE company_id = $1 ORDER BY name_key",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(keys)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_teas_for_company(pool: &PgPool, company_id: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teas WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Looks a tea up by company and name, using the same normalization as the
/// unique key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tea_by_name(
    pool: &PgPool,
    company_id: i64,
    name: &str,
) -> Result<Option<TeaRow>, DbError> {
    let row = sqlx::query_as::<_, TeaRow>(
        "SELECT id, public_id, company_id, name, name_key, brand_name, tea_type, description, \
                origin, steep_temp_f, steep_time_min, steep_time_max, flavor_notes, image_url, \
                product_url, price_usd, source_product_id, avg_rating, rating_count, is_custom, \
                created_at, updated_at \
         FROM teas \
         WHERE company_id = $1 AND name_key = $2",
    )
    .bind(company_id)
    .bind(teadb_core::name_key(name))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
