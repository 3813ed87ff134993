//! `teadb db` handlers.

use std::time::Duration;

use clap::Subcommand;
use teadb_scraper::StorefrontClient;

use crate::registry::load_registry;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert companies from the vendor registry
    Seed,
    /// Find logos for companies that have none
    Logos {
        /// Print what was found without saving
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run_db(
    pool: &sqlx::PgPool,
    config: &teadb_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            teadb_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = teadb_db::run_migrations(pool).await?;
            println!("applied {applied} migrations");
        }
        DbCommands::Seed => {
            let registry = load_registry(config)?;
            let seeded = teadb_db::seed_companies(pool, &registry.vendors).await?;
            println!("seeded {seeded} companies");
        }
        DbCommands::Logos { dry_run } => {
            let client = StorefrontClient::from_config(config)?;
            let delay = Duration::from_millis(config.scraper_inter_request_delay_ms);
            let summary = fill_logos(pool, &client, delay, dry_run).await?;
            println!(
                "logos: {} companies, {} found, {} saved, {} without a logo, {} failed",
                summary.companies, summary.found, summary.saved, summary.missing, summary.failed
            );
        }
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct LogoSummary {
    pub companies: usize,
    pub found: usize,
    pub saved: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Looks up a logo for every company with a website and no `logo_url`.
/// A company whose homepage cannot be fetched is logged and counted.
///
/// # Errors
///
/// Returns an error only if the companies cannot be listed.
pub(crate) async fn fill_logos(
    pool: &sqlx::PgPool,
    client: &StorefrontClient,
    delay: Duration,
    dry_run: bool,
) -> anyhow::Result<LogoSummary> {
    let companies = teadb_db::list_companies_without_logo(pool).await?;
    let mut summary = LogoSummary {
        companies: companies.len(),
        ..LogoSummary::default()
    };

    for (idx, company) in companies.iter().enumerate() {
        let Some(website) = company.website_url.as_deref() else {
            continue;
        };
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let logo = match teadb_scraper::fetch_company_logo(client, website).await {
            Ok(Some(logo)) => logo,
            Ok(None) => {
                tracing::debug!(company = %company.slug, "no logo candidate found");
                summary.missing += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(company = %company.slug, error = %e, "logo lookup failed");
                summary.failed += 1;
                continue;
            }
        };
        summary.found += 1;
        println!("{}: {} ({:?})", company.slug, logo.url, logo.source);
        if dry_run {
            continue;
        }
        match teadb_db::set_company_logo(pool, company.id, &logo.url).await {
            Ok(()) => summary.saved += 1,
            Err(e) => {
                tracing::warn!(company = %company.slug, error = %e, "failed to save logo");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "db_test.rs"]
mod tests;
