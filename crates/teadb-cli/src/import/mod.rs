//! `teadb import` handlers.
//!
//! Vendors are processed one at a time. A vendor whose fetch fails is
//! recorded as failed with nothing written, and the run moves on; the run
//! itself fails only when every vendor failed.

mod vendor;

use clap::Subcommand;
use teadb_core::{AppConfig, CatalogKind};
use teadb_db::{RunTotals, RunType, UpsertMode};
use teadb_scraper::{FetchOptions, StorefrontClient};

use crate::fail_run_best_effort;
use crate::registry::{load_registry, select_vendors};

pub(crate) use vendor::{import_vendor, ImportKind, VendorOutcome, Window};

#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Import teas from tea vendors
    Teas {
        /// Vendor keys to import (default: every tea vendor)
        vendors: Vec<String>,
        /// Fetch and print what would be imported without writing
        #[arg(long)]
        dry_run: bool,
        /// Import at most this many records per vendor
        #[arg(long)]
        limit: Option<usize>,
        /// Skip this many records per vendor first
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Overwrite catalog fields of teas that already exist
        #[arg(long)]
        update: bool,
    },
    /// Import teaware from teaware vendors
    Teaware {
        /// Vendor keys to import (default: every teaware vendor)
        vendors: Vec<String>,
        /// Fetch and print what would be imported without writing
        #[arg(long)]
        dry_run: bool,
        /// Import at most this many records per vendor
        #[arg(long)]
        limit: Option<usize>,
        /// Skip this many records per vendor first
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

pub(crate) async fn run_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: ImportCommands,
) -> anyhow::Result<()> {
    match command {
        ImportCommands::Teas {
            vendors,
            dry_run,
            limit,
            offset,
            update,
        } => {
            let mode = if update {
                UpsertMode::Update
            } else {
                UpsertMode::Skip
            };
            let window = Window { offset, limit };
            run_catalog_import(pool, config, &vendors, ImportKind::Teas(mode), window, dry_run)
                .await
        }
        ImportCommands::Teaware {
            vendors,
            dry_run,
            limit,
            offset,
        } => {
            let window = Window { offset, limit };
            run_catalog_import(pool, config, &vendors, ImportKind::Teaware, window, dry_run).await
        }
    }
}

/// Imports every selected vendor of one catalog, bookkeeping the run in
/// `import_runs` unless `dry_run`.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded, the HTTP client cannot
/// be built, run bookkeeping fails, or every vendor failed.
pub(crate) async fn run_catalog_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    keys: &[String],
    kind: ImportKind,
    window: Window,
    dry_run: bool,
) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    let catalog = kind.catalog();
    let vendors = select_vendors(&registry, catalog, keys);
    if vendors.is_empty() {
        println!("no {catalog} vendors selected; nothing to do");
        return Ok(());
    }

    let client = StorefrontClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;
    let options = FetchOptions::from_config(config);

    if dry_run {
        for v in &vendors {
            vendor::preview_vendor(&client, &options, v, kind, window).await;
        }
        return Ok(());
    }

    let run_type = match catalog {
        CatalogKind::Teas => RunType::Teas,
        CatalogKind::Teaware => RunType::Teaware,
    };
    let run = teadb_db::create_import_run(pool, run_type, "cli", false).await?;
    if let Err(e) = teadb_db::start_import_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, RunTotals::default(), &format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut totals = RunTotals::default();
    let mut failed_vendors = 0usize;

    for v in &vendors {
        match import_vendor(pool, &client, &options, run.id, v, kind, window).await {
            Ok(VendorOutcome::Imported(vendor_totals)) => {
                println!(
                    "{}: imported {}, skipped {}, errored {}",
                    v.name, vendor_totals.imported, vendor_totals.skipped, vendor_totals.errored
                );
                totals.add(vendor_totals);
            }
            Ok(VendorOutcome::Locked) => {
                println!("{}: skipped, another run holds this vendor", v.name);
            }
            Ok(VendorOutcome::Failed(message)) => {
                println!("{}: failed ({message})", v.name);
                failed_vendors += 1;
            }
            Err(e) => {
                tracing::error!(vendor = %v.key, error = %e, "unexpected error importing vendor");
                println!("{}: failed ({e:#})", v.name);
                failed_vendors += 1;
            }
        }
    }

    println!(
        "\n{catalog} import: imported {}, skipped {}, errored {} across {} vendors ({failed_vendors} failed)",
        totals.imported,
        totals.skipped,
        totals.errored,
        vendors.len()
    );

    if failed_vendors == vendors.len() {
        let message = format!("all {failed_vendors} vendors failed");
        fail_run_best_effort(pool, run.id, totals, &message).await;
        anyhow::bail!("{message}");
    }
    if failed_vendors > 0 {
        tracing::warn!(
            failed_vendors,
            total_vendors = vendors.len(),
            "some vendors failed during import"
        );
    }

    if let Err(e) = teadb_db::complete_import_run(pool, run.id, totals).await {
        fail_run_best_effort(pool, run.id, totals, &format!("{e:#}")).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
