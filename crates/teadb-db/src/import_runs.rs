//! Database operations for `import_runs` and `import_run_vendors`.
//!
//! A run moves `queued → running → succeeded | failed`; transitions out of
//! the wrong state are rejected with
//! [`DbError::InvalidImportRunTransition`]. A run interrupted mid-way stays
//! `running`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunType {
    Teas,
    Teaware,
    Audit,
}

impl RunType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunType::Teas => "teas",
            RunType::Teaware => "teaware",
            RunType::Audit => "audit",
        }
    }
}

/// Outcome of one vendor within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorRunStatus {
    Succeeded,
    Failed,
    /// Another run held the vendor's advisory lock.
    Locked,
}

impl VendorRunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VendorRunStatus::Succeeded => "succeeded",
            VendorRunStatus::Failed => "failed",
            VendorRunStatus::Locked => "locked",
        }
    }
}

/// Record counts accumulated over a run or a vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub imported: i32,
    pub skipped: i32,
    pub errored: i32,
}

impl RunTotals {
    pub fn add(&mut self, other: RunTotals) {
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.errored += other.errored;
    }
}

/// Per-vendor result written to `import_run_vendors`.
#[derive(Debug, Clone)]
pub struct VendorRunResult<'a> {
    pub vendor_key: &'a str,
    pub company_id: Option<i64>,
    pub status: VendorRunStatus,
    pub fetched: i32,
    pub totals: RunTotals,
    pub error_message: Option<&'a str>,
}

/// A row from the `import_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub run_type: String,
    pub trigger_source: String,
    pub status: String,
    pub dry_run: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub imported: i32,
    pub skipped: i32,
    pub errored: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `import_run_vendors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunVendorRow {
    pub id: i64,
    pub import_run_id: i64,
    pub vendor_key: String,
    pub company_id: Option<i64>,
    pub status: String,
    pub fetched: i32,
    pub imported: i32,
    pub skipped: i32,
    pub errored: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, run_type, trigger_source, status, dry_run, \
     started_at, completed_at, imported, skipped, errored, error_message, created_at";

/// Creates a new import run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_import_run(
    pool: &PgPool,
    run_type: RunType,
    trigger_source: &str,
    dry_run: bool,
) -> Result<ImportRunRow, DbError> {
    let row = sqlx::query_as::<_, ImportRunRow>(&format!(
        "INSERT INTO import_runs (public_id, run_type, trigger_source, status, dry_run) \
         VALUES ($1, $2, $3, 'queued', $4) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(run_type.as_str())
    .bind(trigger_source)
    .bind(dry_run)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_import_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a running run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_import_run(pool: &PgPool, id: i64, totals: RunTotals) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             imported = $2, skipped = $3, errored = $4 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(totals.imported)
    .bind(totals.skipped)
    .bind(totals.errored)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a running run as `failed`, keeping whatever totals were reached.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_import_run(
    pool: &PgPool,
    id: i64,
    totals: RunTotals,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'failed', completed_at = NOW(), \
             imported = $2, skipped = $3, errored = $4, error_message = $5 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(totals.imported)
    .bind(totals.skipped)
    .bind(totals.errored)
    .bind(error_message)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has this `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_import_run(pool: &PgPool, id: i64) -> Result<ImportRunRow, DbError> {
    sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_runs(pool: &PgPool, limit: i64) -> Result<Vec<ImportRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts or replaces the per-vendor result row for a run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_import_run_vendor(
    pool: &PgPool,
    run_id: i64,
    result: &VendorRunResult<'_>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO import_run_vendors \
             (import_run_id, vendor_key, company_id, status, fetched, \
              imported, skipped, errored, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (import_run_id, vendor_key) DO UPDATE SET \
             company_id    = EXCLUDED.company_id, \
             status        = EXCLUDED.status, \
             fetched       = EXCLUDED.fetched, \
             imported      = EXCLUDED.imported, \
             skipped       = EXCLUDED.skipped, \
             errored       = EXCLUDED.errored, \
             error_message = EXCLUDED.error_message",
    )
    .bind(run_id)
    .bind(result.vendor_key)
    .bind(result.company_id)
    .bind(result.status.as_str())
    .bind(result.fetched)
    .bind(result.totals.imported)
    .bind(result.totals.skipped)
    .bind(result.totals.errored)
    .bind(result.error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Vendor rows for a run in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_run_vendors(
    pool: &PgPool,
    run_id: i64,
) -> Result<Vec<ImportRunVendorRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunVendorRow>(
        "SELECT id, import_run_id, vendor_key, company_id, status, fetched, \
                imported, skipped, errored, error_message, created_at \
         FROM import_run_vendors \
         WHERE import_run_id = $1 \
         ORDER BY id",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_totals_accumulate() {
        let mut total = RunTotals::default();
        total.add(RunTotals {
            imported: 3,
            skipped: 1,
            errored: 0,
        });
        total.add(RunTotals {
            imported: 0,
            skipped: 4,
            errored: 2,
        });
        assert_eq!(
            total,
            RunTotals {
                imported: 3,
                skipped: 5,
                errored: 2
            }
        );
    }

    #[test]
    fn status_strings_match_schema_checks() {
        assert_eq!(RunType::Teaware.as_str(), "teaware");
        assert_eq!(VendorRunStatus::Locked.as_str(), "locked");
    }
}
