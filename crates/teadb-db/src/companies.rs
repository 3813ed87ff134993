//! Database operations for the `companies` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use teadb_core::VendorConfig;
use uuid::Uuid;

use crate::DbError;

/// A row from the `companies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub headquarters_city: Option<String>,
    pub headquarters_state: Option<String>,
    pub headquarters_country: Option<String>,
    pub founded_year: Option<i32>,
    pub specialty: Vec<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COMPANY_COLUMNS: &str = "id, public_id, name, slug, description, website_url, \
     headquarters_city, headquarters_state, headquarters_country, founded_year, specialty, \
     logo_url, created_at, updated_at";

/// Returns the id of the company for `vendor`, creating it on first encounter.
///
/// An existing row is left as is; a concurrent insert of the same slug
/// resolves to the winner's id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn ensure_company(pool: &PgPool, vendor: &VendorConfig) -> Result<i64, DbError> {
    let slug = vendor.slug();

    // `DO UPDATE` on a no-op column so RETURNING yields the id on conflict too.
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO companies \
             (name, slug, description, website_url, headquarters_city, headquarters_state, \
              headquarters_country, founded_year, specialty) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug \
         RETURNING id",
    )
    .bind(&vendor.name)
    .bind(&slug)
    .bind(&vendor.description)
    .bind(&vendor.url)
    .bind(&vendor.city)
    .bind(&vendor.state)
    .bind(&vendor.country)
    .bind(vendor.founded)
    .bind(&vendor.specialty)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Upserts every vendor's company metadata from the registry.
///
/// Unlike [`ensure_company`], existing rows are refreshed. Vendors sharing a
/// slug across catalogs map to one company. All writes run in one
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_companies(pool: &PgPool, vendors: &[VendorConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for vendor in vendors {
        sqlx::query(
            "INSERT INTO companies \
                 (name, slug, description, website_url, headquarters_city, headquarters_state, \
                  headquarters_country, founded_year, specialty) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name                 = EXCLUDED.name, \
                 description          = COALESCE(EXCLUDED.description, companies.description), \
                 website_url          = EXCLUDED.website_url, \
                 headquarters_city    = COALESCE(EXCLUDED.headquarters_city, companies.headquarters_city), \
                 headquarters_state   = COALESCE(EXCLUDED.headquarters_state, companies.headquarters_state), \
                 headquarters_country = COALESCE(EXCLUDED.headquarters_country, companies.headquarters_country), \
                 founded_year         = COALESCE(EXCLUDED.founded_year, companies.founded_year), \
                 specialty            = EXCLUDED.specialty, \
                 updated_at           = NOW()",
        )
        .bind(&vendor.name)
        .bind(vendor.slug())
        .bind(&vendor.description)
        .bind(&vendor.url)
        .bind(&vendor.city)
        .bind(&vendor.state)
        .bind(&vendor.country)
        .bind(vendor.founded)
        .bind(&vendor.specialty)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}

/// Returns a company by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company_by_slug(pool: &PgPool, slug: &str) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Companies with a website but no logo, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_companies_without_logo(pool: &PgPool) -> Result<Vec<CompanyRow>, DbError> {
    let rows = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies \
         WHERE logo_url IS NULL AND website_url IS NOT NULL \
         ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sets `companies.logo_url` for `company_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no company has `company_id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_company_logo(
    pool: &PgPool,
    company_id: i64,
    logo_url: &str,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE companies SET logo_url = $2, updated_at = NOW() WHERE id = $1")
        .bind(company_id)
        .bind(logo_url)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_companies(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
