mod audit;
mod db;
mod embeddings;
mod import;
mod notes;
mod registry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::embeddings::EmbeddingsCommands;
use crate::import::ImportCommands;
use crate::notes::NotesCommands;

#[derive(Debug, Parser)]
#[command(name = "teadb")]
#[command(about = "Tea catalog ingestion: import, audit, and enrich vendor catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import vendor catalogs into the database
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Compare live tea catalogs with stored teas and report what is new
    Audit {
        /// Vendor keys to audit (default: every tea vendor)
        vendors: Vec<String>,
        /// Insert the new teas found
        #[arg(long)]
        apply: bool,
        /// Where to write the JSON audit log (default: TEADB_AUDIT_LOG_PATH)
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// AI-generated tasting notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Search embeddings for teas
    Embeddings {
        #[command(subcommand)]
        command: EmbeddingsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = teadb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = teadb_db::PoolConfig::from_app_config(&config);
    let pool = teadb_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Db { command } => db::run_db(&pool, &config, command).await,
        Commands::Import { command } => import::run_import(&pool, &config, command).await,
        Commands::Audit { vendors, apply, log } => {
            let log_path = log.unwrap_or_else(|| config.audit_log_path.clone());
            audit::run_audit(&pool, &config, &vendors, apply, &log_path).await
        }
        Commands::Notes { command } => notes::run_notes(&pool, &config, command).await,
        Commands::Embeddings { command } => {
            embeddings::run_embeddings(&pool, &config, command).await
        }
    }
}

/// Converts a record count for an `INTEGER` column, saturating.
pub(crate) fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Marks a run failed, logging rather than propagating if that write fails.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    totals: teadb_db::RunTotals,
    message: &str,
) {
    if let Err(e) = teadb_db::fail_import_run(pool, run_id, totals, message).await {
        tracing::error!(run_id, error = %e, "failed to mark import run as failed");
    }
}

/// Writes a vendor's result row, logging rather than propagating a failure.
pub(crate) async fn record_vendor_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    result: &teadb_db::VendorRunResult<'_>,
) {
    if let Err(e) = teadb_db::upsert_import_run_vendor(pool, run_id, result).await {
        tracing::error!(
            run_id,
            vendor = %result.vendor_key,
            error = %e,
            "failed to record vendor result"
        );
    }
}
