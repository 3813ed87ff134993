//! `teadb embeddings`: search vectors for teas that have none.

use std::time::Duration;

use clap::Subcommand;
use teadb_core::AppConfig;
use teadb_db::TeaForEmbedding;
use teadb_notes::{embedding_text, EmbeddingsClient};

const BATCH_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Subcommand)]
pub enum EmbeddingsCommands {
    /// Embed teas that have no stored vector
    Generate {
        /// Embed at most this many teas
        #[arg(long)]
        limit: Option<i64>,
        /// List what would be embedded without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run_embeddings(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: EmbeddingsCommands,
) -> anyhow::Result<()> {
    match command {
        EmbeddingsCommands::Generate { limit, dry_run } => {
            if dry_run {
                return preview_embeddings(pool, limit).await;
            }
            let client = EmbeddingsClient::from_config(config)?;
            let summary =
                generate_embeddings(pool, &client, config.embeddings_batch_size, limit).await?;
            summary.check()
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EmbeddingsSummary {
    pub teas: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub saved: usize,
    pub save_errors: usize,
}

impl EmbeddingsSummary {
    fn check(&self) -> anyhow::Result<()> {
        if self.batches > 0 && self.failed_batches == self.batches {
            anyhow::bail!("all {} embedding batches failed", self.batches);
        }
        Ok(())
    }
}

pub(crate) fn text_for(tea: &TeaForEmbedding) -> String {
    embedding_text(
        &tea.name,
        &tea.tea_type,
        tea.description.as_deref(),
        &tea.flavor_notes,
        tea.origin.as_deref(),
    )
}

async fn preview_embeddings(pool: &sqlx::PgPool, limit: Option<i64>) -> anyhow::Result<()> {
    let teas = teadb_db::list_teas_without_embedding(pool, limit).await?;
    println!("{} teas need embeddings", teas.len());
    for tea in teas.iter().take(3) {
        println!("\n{}\n  {}", tea.name, text_for(tea));
    }
    println!("dry run: nothing embedded");
    Ok(())
}

/// Embeds every tea without a vector, one batch at a time. Teas that already
/// have one are never selected, so reruns only pick up what is missing.
///
/// # Errors
///
/// Returns an error only if the teas cannot be listed. Batch and save
/// failures are counted in the summary.
pub(crate) async fn generate_embeddings(
    pool: &sqlx::PgPool,
    client: &EmbeddingsClient,
    batch_size: usize,
    limit: Option<i64>,
) -> anyhow::Result<EmbeddingsSummary> {
    let teas = teadb_db::list_teas_without_embedding(pool, limit).await?;
    let mut summary = EmbeddingsSummary {
        teas: teas.len(),
        ..EmbeddingsSummary::default()
    };
    if teas.is_empty() {
        println!("every tea already has an embedding");
        return Ok(summary);
    }

    let batches: Vec<&[TeaForEmbedding]> = teas.chunks(batch_size.max(1)).collect();
    summary.batches = batches.len();
    println!(
        "{} teas in {} batches (model {})",
        teas.len(),
        batches.len(),
        client.model()
    );

    for (i, batch) in batches.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(BATCH_PAUSE).await;
        }
        let texts: Vec<String> = batch.iter().map(text_for).collect();
        let vectors = match client.embed(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                tracing::error!(batch = i + 1, teas = batch.len(), error = %e, "embedding batch failed");
                summary.failed_batches += 1;
                continue;
            }
        };

        for (tea, vector) in batch.iter().zip(&vectors) {
            match teadb_db::set_tea_embedding(pool, tea.id, vector, client.model()).await {
                Ok(()) => summary.saved += 1,
                Err(e) => {
                    tracing::warn!(tea = %tea.name, error = %e, "failed to save embedding");
                    summary.save_errors += 1;
                }
            }
        }
        tracing::info!(batch = i + 1, of = batches.len(), "embedding batch saved");
    }

    println!(
        "\nembeddings: {} saved, {} save errors, {}/{} batches failed",
        summary.saved, summary.save_errors, summary.failed_batches, summary.batches
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "embeddings_test.rs"]
mod tests;
