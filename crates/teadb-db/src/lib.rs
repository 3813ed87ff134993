//! Postgres persistence for the tea catalog: companies, teas and their
//! embeddings, teaware, tasting notes, and import-run bookkeeping.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use teadb_core::AppConfig;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Relative to this crate's manifest.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("import run {id} is not in status '{expected_status}'")]
    InvalidImportRunTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Opens the pool; `min_connections` are established eagerly.
///
/// # Errors
///
/// Returns [`sqlx::Error`] when Postgres is unreachable or rejects the URL.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Applies pending migrations from `migrations/` and returns how many ran.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] on the first failing migration.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; count that as zero.
    let applied_before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Round-trips `SELECT 1`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if no connection can run it.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Converts an `f64` USD amount to a two-place `NUMERIC`.
pub(crate) fn price_to_decimal(price: Option<f64>) -> Result<Option<rust_decimal::Decimal>, DbError> {
    price
        .map(|p| {
            rust_decimal::Decimal::try_from(p)
                .map(|d| d.round_dp(2))
                .map_err(|_| DbError::OutOfRange {
                    field: "price_usd",
                    value: p.to_string(),
                })
        })
        .transpose()
}


pub mod companies;
pub mod embeddings;
pub mod import_runs;
pub mod locks;
pub mod tasting_notes;
pub mod teas;
pub mod teaware;

pub use companies::{
    count_companies, ensure_company, get_company_by_slug, list_companies_without_logo,
    seed_companies, set_company_logo, CompanyRow,
};
pub use embeddings::{
    get_tea_embedding, list_teas_without_embedding, set_tea_embedding, TeaForEmbedding,
};
pub use import_runs::{
    complete_import_run, create_import_run, fail_import_run, get_import_run,
    list_import_run_vendors, list_import_runs, start_import_run, upsert_import_run_vendor,
    ImportRunRow, ImportRunVendorRow, RunTotals, RunType, VendorRunResult, VendorRunStatus,
};
pub use locks::VendorLock;
pub use tasting_notes::{
    get_tasting_note, list_teas_without_notes, upsert_tasting_note, TastingNoteRow, TeaForNotes,
};
pub use teas::{count_teas_for_company, get_tea_by_name, list_tea_name_keys, upsert_tea, TeaRow};
pub use teaware::{get_teaware_by_slug, upsert_teaware, TeawareRow};

/// How an upsert treats a row whose natural key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Leave the stored row untouched and report it as skipped.
    Skip,
    /// Overwrite catalog fields on the stored row.
    Update,
}

/// Result of writing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
    Skipped,
}
