//! One vendor's import: lock, fetch, window, write, record.

use teadb_core::{CatalogKind, NormalizedTea, NormalizedTeaware, VendorConfig};
use teadb_db::{
    RunTotals, UpsertMode, VendorLock, VendorRunResult, VendorRunStatus, WriteOutcome,
};
use teadb_scraper::{FetchOptions, FetchedCatalog, ScraperError, StorefrontClient};

use crate::{count_i32, record_vendor_best_effort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportKind {
    Teas(UpsertMode),
    Teaware,
}

impl ImportKind {
    pub(crate) fn catalog(self) -> CatalogKind {
        match self {
            ImportKind::Teas(_) => CatalogKind::Teas,
            ImportKind::Teaware => CatalogKind::Teaware,
        }
    }
}

/// `--offset` / `--limit` over a vendor's normalized records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Window {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Window {
    pub(crate) fn apply<T>(self, records: Vec<T>) -> Vec<T> {
        records
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum VendorOutcome {
    Imported(RunTotals),
    /// Another run held this vendor's lock; nothing was done.
    Locked,
    /// Fetch or company setup failed; nothing was written.
    Failed(String),
}

enum Fetched {
    Teas(FetchedCatalog<NormalizedTea>, UpsertMode),
    Teaware(FetchedCatalog<NormalizedTeaware>),
}

impl Fetched {
    fn len(&self) -> usize {
        match self {
            Fetched::Teas(c, _) => c.records.len(),
            Fetched::Teaware(c) => c.records.len(),
        }
    }
}

async fn fetch(
    client: &StorefrontClient,
    options: &FetchOptions,
    vendor: &VendorConfig,
    kind: ImportKind,
) -> Result<Fetched, ScraperError> {
    Ok(match kind {
        ImportKind::Teas(mode) => Fetched::Teas(
            teadb_scraper::fetch_vendor_teas(client, vendor, options).await?,
            mode,
        ),
        ImportKind::Teaware => {
            Fetched::Teaware(teadb_scraper::fetch_vendor_teaware(client, vendor, options).await?)
        }
    })
}

/// Imports one vendor under its advisory lock and records the vendor row.
///
/// # Errors
///
/// Returns an error only for bookkeeping failures: acquiring the lock or
/// recording a successful vendor row. Fetch and company failures are
/// reported as [`VendorOutcome::Failed`].
pub(crate) async fn import_vendor(
    pool: &sqlx::PgPool,
    client: &StorefrontClient,
    options: &FetchOptions,
    run_id: i64,
    vendor: &VendorConfig,
    kind: ImportKind,
    window: Window,
) -> anyhow::Result<VendorOutcome> {
    let Some(lock) = VendorLock::try_acquire(pool, &vendor.lock_name()).await? else {
        tracing::warn!(vendor = %vendor.key, "vendor is locked by another run, skipping");
        record_vendor_best_effort(
            pool,
            run_id,
            &VendorRunResult {
                vendor_key: &vendor.key,
                company_id: None,
                status: VendorRunStatus::Locked,
                fetched: 0,
                totals: RunTotals::default(),
                error_message: None,
            },
        )
        .await;
        return Ok(VendorOutcome::Locked);
    };

    let outcome = import_locked(pool, client, options, run_id, vendor, kind, window).await;

    if let Err(e) = lock.release().await {
        tracing::warn!(vendor = %vendor.key, error = %e, "failed to release vendor lock");
    }
    outcome
}

async fn import_locked(
    pool: &sqlx::PgPool,
    client: &StorefrontClient,
    options: &FetchOptions,
    run_id: i64,
    vendor: &VendorConfig,
    kind: ImportKind,
    window: Window,
) -> anyhow::Result<VendorOutcome> {
    let fetched = match fetch(client, options, vendor, kind).await {
        Ok(fetched) => fetched,
        Err(e) => {
            let message = e.to_string();
            tracing::error!(vendor = %vendor.key, error = %message, "failed to fetch catalog");
            record_failure(pool, run_id, vendor, &message).await;
            return Ok(VendorOutcome::Failed(message));
        }
    };
    let fetched_count = count_i32(fetched.len());

    let company_id = match teadb_db::ensure_company(pool, vendor).await {
        Ok(id) => id,
        Err(e) => {
            let message = format!("failed to ensure company: {e}");
            tracing::error!(vendor = %vendor.key, error = %e, "failed to ensure company");
            record_failure(pool, run_id, vendor, &message).await;
            return Ok(VendorOutcome::Failed(message));
        }
    };

    let totals = match fetched {
        Fetched::Teas(catalog, mode) => {
            write_teas(pool, company_id, vendor, window.apply(catalog.records), mode).await
        }
        Fetched::Teaware(catalog) => {
            write_teaware(pool, company_id, vendor, window.apply(catalog.records)).await
        }
    };

    let result = VendorRunResult {
        vendor_key: &vendor.key,
        company_id: Some(company_id),
        status: VendorRunStatus::Succeeded,
        fetched: fetched_count,
        totals,
        error_message: None,
    };
    if let Err(e) = teadb_db::upsert_import_run_vendor(pool, run_id, &result).await {
        tracing::error!(
            vendor = %vendor.key,
            run_id,
            error = %e,
            "records saved but the vendor result row could not be written"
        );
        return Err(e.into());
    }

    Ok(VendorOutcome::Imported(totals))
}

async fn write_teas(
    pool: &sqlx::PgPool,
    company_id: i64,
    vendor: &VendorConfig,
    teas: Vec<NormalizedTea>,
    mode: UpsertMode,
) -> RunTotals {
    let mut totals = RunTotals::default();
    for tea in &teas {
        match teadb_db::upsert_tea(pool, company_id, tea, mode).await {
            Ok(WriteOutcome::Inserted | WriteOutcome::Updated) => totals.imported += 1,
            Ok(WriteOutcome::Skipped) => totals.skipped += 1,
            Err(e) => {
                tracing::warn!(vendor = %vendor.key, tea = %tea.name, error = %e, "failed to write tea");
                totals.errored += 1;
            }
        }
    }
    totals
}

async fn write_teaware(
    pool: &sqlx::PgPool,
    company_id: i64,
    vendor: &VendorConfig,
    items: Vec<NormalizedTeaware>,
) -> RunTotals {
    let mut totals = RunTotals::default();
    for item in &items {
        match teadb_db::upsert_teaware(pool, company_id, item).await {
            Ok(WriteOutcome::Skipped) => totals.skipped += 1,
            Ok(_) => totals.imported += 1,
            Err(e) => {
                tracing::warn!(vendor = %vendor.key, teaware = %item.slug, error = %e, "failed to write teaware");
                totals.errored += 1;
            }
        }
    }
    totals
}

async fn record_failure(
    pool: &sqlx::PgPool,
    run_id: i64,
    vendor: &VendorConfig,
    message: &str,
) {
    record_vendor_best_effort(
        pool,
        run_id,
        &VendorRunResult {
            vendor_key: &vendor.key,
            company_id: None,
            status: VendorRunStatus::Failed,
            fetched: 0,
            totals: RunTotals::default(),
            error_message: Some(message),
        },
    )
    .await;
}

/// Fetches a vendor and prints the records an import would write.
pub(crate) async fn preview_vendor(
    client: &StorefrontClient,
    options: &FetchOptions,
    vendor: &VendorConfig,
    kind: ImportKind,
    window: Window,
) {
    println!("\n--- {} ({}) ---", vendor.name, vendor.key);
    let fetched = match fetch(client, options, vendor, kind).await {
        Ok(fetched) => fetched,
        Err(e) => {
            println!("  fetch failed: {e}");
            return;
        }
    };

    match fetched {
        Fetched::Teas(catalog, _) => {
            println!(
                "  {} teas ({} filtered out, {} invalid)",
                catalog.records.len(),
                catalog.filtered_out,
                catalog.invalid
            );
            for tea in window.apply(catalog.records) {
                println!(
                    "  {} [{}] {}",
                    tea.name,
                    tea.tea_type,
                    format_price(tea.price_usd)
                );
            }
        }
        Fetched::Teaware(catalog) => {
            println!(
                "  {} items ({} filtered out, {} invalid)",
                catalog.records.len(),
                catalog.filtered_out,
                catalog.invalid
            );
            for item in window.apply(catalog.records) {
                println!(
                    "  {} [{} / {}] {}",
                    item.name,
                    item.category,
                    item.material,
                    format_price(item.price_usd)
                );
            }
        }
    }
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("${p:.2}"))
}
