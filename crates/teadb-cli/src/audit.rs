//! `teadb audit`: diff each tea vendor's live catalog against stored teas.
//!
//! Report-only by default. With `--apply` the new teas are inserted through
//! the regular upserter under the vendor's import lock.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use teadb_core::{AppConfig, CatalogKind, NormalizedTea, VendorConfig};
use teadb_db::{
    RunTotals, RunType, UpsertMode, VendorLock, VendorRunResult, VendorRunStatus, WriteOutcome,
};
use teadb_scraper::{FetchOptions, StorefrontClient};

use crate::registry::{load_registry, select_vendors};
use crate::{count_i32, fail_run_best_effort, record_vendor_best_effort};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AuditStatus {
    Ok,
    ScrapeFailed,
    Locked,
    Error,
}

impl AuditStatus {
    fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Ok => "ok",
            AuditStatus::ScrapeFailed => "scrape_failed",
            AuditStatus::Locked => "locked",
            AuditStatus::Error => "error",
        }
    }
}

/// One vendor's line in the audit log.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuditEntry {
    pub brand: String,
    pub status: AuditStatus,
    pub website_count: usize,
    pub db_count: usize,
    pub added: usize,
    pub new_teas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEntry {
    fn failed(vendor: &VendorConfig, status: AuditStatus, error: String) -> Self {
        Self {
            brand: vendor.name.clone(),
            status,
            website_count: 0,
            db_count: 0,
            added: 0,
            new_teas: Vec::new(),
            error: Some(error),
        }
    }

    fn is_failure(&self) -> bool {
        matches!(self.status, AuditStatus::ScrapeFailed | AuditStatus::Error)
    }
}

/// Live teas whose name key is not stored yet, first occurrence per key.
pub(crate) fn new_teas<'a>(
    live: &'a [NormalizedTea],
    stored_keys: &HashSet<String>,
) -> Vec<&'a NormalizedTea> {
    let mut seen = HashSet::new();
    live.iter()
        .filter(|tea| {
            let key = tea.name_key();
            !stored_keys.contains(&key) && seen.insert(key)
        })
        .collect()
}

/// Audits every selected tea vendor, writes the JSON log, and records an
/// `audit` import run.
///
/// # Errors
///
/// Returns an error if the registry or HTTP client cannot be set up, run
/// bookkeeping fails, the log cannot be written, or every vendor failed.
pub(crate) async fn run_audit(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    keys: &[String],
    apply: bool,
    log_path: &Path,
) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    let vendors = select_vendors(&registry, CatalogKind::Teas, keys);
    if vendors.is_empty() {
        println!("no tea vendors selected; nothing to audit");
        return Ok(());
    }

    let client = StorefrontClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;
    let options = FetchOptions::from_config(config);

    let run = teadb_db::create_import_run(pool, RunType::Audit, "cli", !apply).await?;
    if let Err(e) = teadb_db::start_import_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, RunTotals::default(), &format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut entries = Vec::with_capacity(vendors.len());
    let mut totals = RunTotals::default();
    for vendor in &vendors {
        let (entry, vendor_totals) =
            audit_vendor(pool, &client, &options, run.id, vendor, apply).await;
        totals.add(vendor_totals);
        entries.push(entry);
    }

    print_summary(&entries, apply);

    if let Err(e) = write_log(log_path, &entries) {
        fail_run_best_effort(pool, run.id, totals, &format!("{e:#}")).await;
        return Err(e);
    }
    println!("audit log written to {}", log_path.display());

    let failed = entries.iter().filter(|e| e.is_failure()).count();
    if failed == entries.len() {
        let message = format!("all {failed} vendors failed");
        fail_run_best_effort(pool, run.id, totals, &message).await;
        anyhow::bail!("{message}");
    }

    if let Err(e) = teadb_db::complete_import_run(pool, run.id, totals).await {
        fail_run_best_effort(pool, run.id, totals, &format!("{e:#}")).await;
        return Err(e.into());
    }
    Ok(())
}

async fn audit_vendor(
    pool: &sqlx::PgPool,
    client: &StorefrontClient,
    options: &FetchOptions,
    run_id: i64,
    vendor: &VendorConfig,
    apply: bool,
) -> (AuditEntry, RunTotals) {
    let lock = if apply {
        match VendorLock::try_acquire(pool, &vendor.lock_name()).await {
            Ok(Some(lock)) => Some(lock),
            Ok(None) => {
                tracing::warn!(vendor = %vendor.key, "vendor is locked by another run, skipping");
                record_status(pool, run_id, vendor, VendorRunStatus::Locked, None).await;
                let entry = AuditEntry::failed(
                    vendor,
                    AuditStatus::Locked,
                    "locked by another run".to_string(),
                );
                return (entry, RunTotals::default());
            }
            Err(e) => {
                let message = format!("failed to acquire vendor lock: {e}");
                record_status(pool, run_id, vendor, VendorRunStatus::Failed, Some(&message)).await;
                return (
                    AuditEntry::failed(vendor, AuditStatus::Error, message),
                    RunTotals::default(),
                );
            }
        }
    } else {
        None
    };

    let result = audit_locked(pool, client, options, run_id, vendor, apply).await;

    if let Some(lock) = lock {
        if let Err(e) = lock.release().await {
            tracing::warn!(vendor = %vendor.key, error = %e, "failed to release vendor lock");
        }
    }
    result
}

async fn audit_locked(
    pool: &sqlx::PgPool,
    client: &StorefrontClient,
    options: &FetchOptions,
    run_id: i64,
    vendor: &VendorConfig,
    apply: bool,
) -> (AuditEntry, RunTotals) {
    let live = match teadb_scraper::fetch_vendor_teas(client, vendor, options).await {
        Ok(catalog) => catalog.records,
        Err(e) => {
            let message = e.to_string();
            tracing::error!(vendor = %vendor.key, error = %message, "audit scrape failed");
            record_status(pool, run_id, vendor, VendorRunStatus::Failed, Some(&message)).await;
            return (
                AuditEntry::failed(vendor, AuditStatus::ScrapeFailed, message),
                RunTotals::default(),
            );
        }
    };

    let stored = async {
        let company_id = teadb_db::ensure_company(pool, vendor).await?;
        let keys = teadb_db::list_tea_name_keys(pool, company_id).await?;
        Ok::<_, teadb_db::DbError>((company_id, keys))
    };
    let (company_id, stored_keys) = match stored.await {
        Ok(stored) => stored,
        Err(e) => {
            let message = e.to_string();
            tracing::error!(vendor = %vendor.key, error = %message, "failed to load stored teas");
            record_status(pool, run_id, vendor, VendorRunStatus::Failed, Some(&message)).await;
            return (
                AuditEntry::failed(vendor, AuditStatus::Error, message),
                RunTotals::default(),
            );
        }
    };
    let db_count = stored_keys.len();
    let stored_keys: HashSet<String> = stored_keys.into_iter().collect();

    let fresh = new_teas(&live, &stored_keys);
    let mut totals = RunTotals::default();
    if apply {
        for tea in &fresh {
            match teadb_db::upsert_tea(pool, company_id, tea, UpsertMode::Skip).await {
                Ok(WriteOutcome::Skipped) => totals.skipped += 1,
                Ok(_) => totals.imported += 1,
                Err(e) => {
                    tracing::warn!(vendor = %vendor.key, tea = %tea.name, error = %e, "failed to insert tea");
                    totals.errored += 1;
                }
            }
        }
    }

    let result = VendorRunResult {
        vendor_key: &vendor.key,
        company_id: Some(company_id),
        status: VendorRunStatus::Succeeded,
        fetched: count_i32(live.len()),
        totals,
        error_message: None,
    };
    record_vendor_best_effort(pool, run_id, &result).await;

    let entry = AuditEntry {
        brand: vendor.name.clone(),
        status: AuditStatus::Ok,
        website_count: live.len(),
        db_count,
        added: usize::try_from(totals.imported).unwrap_or(0),
        new_teas: fresh.iter().map(|t| t.name.clone()).collect(),
        error: None,
    };
    (entry, totals)
}

async fn record_status(
    pool: &sqlx::PgPool,
    run_id: i64,
    vendor: &VendorConfig,
    status: VendorRunStatus,
    error_message: Option<&str>,
) {
    let result = VendorRunResult {
        vendor_key: &vendor.key,
        company_id: None,
        status,
        fetched: 0,
        totals: RunTotals::default(),
        error_message,
    };
    record_vendor_best_effort(pool, run_id, &result).await;
}

fn print_summary(entries: &[AuditEntry], apply: bool) {
    for entry in entries {
        match entry.status {
            AuditStatus::Ok => println!(
                "{}: {} live, {} stored, {} new",
                entry.brand,
                entry.website_count,
                entry.db_count,
                entry.new_teas.len()
            ),
            _ => println!(
                "{}: {} ({})",
                entry.brand,
                entry.status.as_str(),
                entry.error.as_deref().unwrap_or_default()
            ),
        }
    }

    let failed: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_failure())
        .map(|e| e.brand.as_str())
        .collect();
    let total_new: usize = entries.iter().map(|e| e.new_teas.len()).sum();
    let total_added: usize = entries.iter().map(|e| e.added).sum();

    println!("\n=== Audit summary ===");
    println!("vendors checked: {}", entries.len());
    if apply {
        println!("teas added: {total_added}");
    } else {
        println!("new teas found: {total_new} (run with --apply to insert)");
    }
    if !failed.is_empty() {
        println!("failed vendors: {}", failed.join(", "));
    }
    for entry in entries.iter().filter(|e| !e.new_teas.is_empty()) {
        println!("  {}:", entry.brand);
        for name in &entry.new_teas {
            println!("    + {name}");
        }
    }
}

fn write_log(path: &Path, entries: &[AuditEntry]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(entries).context("failed to serialize audit log")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "audit_test.rs"]
mod tests;
