//! `teadb notes`: AI tasting notes for imported teas that have none.

use std::time::Duration;

use clap::Subcommand;
use futures::stream::{self, StreamExt};
use teadb_core::AppConfig;
use teadb_db::TeaForNotes;
use teadb_notes::{
    brief_description, steep_time_label, GeneratedNote, NotesClient, NotesError, TeaBrief,
    NOTE_ATTRIBUTION,
};

/// Pause between windows of concurrent requests.
const WINDOW_PAUSE: Duration = Duration::from_secs(1);

/// Notes printed per batch on a dry run.
const DRY_RUN_PREVIEW: usize = 3;

#[derive(Debug, Subcommand)]
pub enum NotesCommands {
    /// Generate tasting notes for teas without one
    Generate {
        /// Print sample notes without saving
        #[arg(long)]
        dry_run: bool,
        /// Process at most this many teas
        #[arg(long)]
        limit: Option<i64>,
        /// Skip this many teas first
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

pub(crate) async fn run_notes(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: NotesCommands,
) -> anyhow::Result<()> {
    match command {
        NotesCommands::Generate {
            dry_run,
            limit,
            offset,
        } => {
            let client = NotesClient::from_config(config)?;
            let settings = GenerateSettings {
                batch_size: config.notes_batch_size,
                concurrency: config.notes_concurrency,
                limit,
                offset,
                dry_run,
            };
            let summary = generate_notes(pool, &client, settings).await?;
            summary.check()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerateSettings {
    pub batch_size: usize,
    pub concurrency: usize,
    pub limit: Option<i64>,
    pub offset: i64,
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct NotesSummary {
    pub teas: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub generated: usize,
    pub saved: usize,
    pub save_errors: usize,
}

impl NotesSummary {
    /// Fails when there was work and every batch failed.
    fn check(&self) -> anyhow::Result<()> {
        if self.batches > 0 && self.failed_batches == self.batches {
            anyhow::bail!("all {} note batches failed", self.batches);
        }
        Ok(())
    }
}

pub(crate) fn brief_for(tea: &TeaForNotes) -> TeaBrief {
    TeaBrief {
        tea_id: tea.id,
        name: tea.name.clone(),
        brand: tea.brand_name.clone(),
        tea_type: tea.tea_type.clone(),
        description: brief_description(tea.description.as_deref()),
        flavors: tea.flavor_notes.clone(),
        steep_temp: tea.steep_temp_f,
        steep_time: steep_time_label(tea.steep_time_min, tea.steep_time_max),
    }
}

/// Generates notes for every selected tea and saves them unless dry-run.
///
/// # Errors
///
/// Returns an error only if the teas cannot be listed. Batch and save
/// failures are counted in the summary.
pub(crate) async fn generate_notes(
    pool: &sqlx::PgPool,
    client: &NotesClient,
    settings: GenerateSettings,
) -> anyhow::Result<NotesSummary> {
    let teas = teadb_db::list_teas_without_notes(pool, settings.limit, settings.offset).await?;
    let mut summary = NotesSummary {
        teas: teas.len(),
        ..NotesSummary::default()
    };
    if teas.is_empty() {
        println!("no teas need tasting notes");
        return Ok(summary);
    }

    let briefs: Vec<TeaBrief> = teas.iter().map(brief_for).collect();
    let batches: Vec<&[TeaBrief]> = briefs.chunks(settings.batch_size.max(1)).collect();
    let concurrency = settings.concurrency.max(1);
    summary.batches = batches.len();
    println!(
        "{} teas in {} batches (model {}, {concurrency} at a time)",
        teas.len(),
        batches.len(),
        client.model()
    );

    let windows: Vec<&[&[TeaBrief]]> = batches.chunks(concurrency).collect();
    for (i, window) in windows.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(WINDOW_PAUSE).await;
        }

        let results: Vec<Result<Vec<GeneratedNote>, NotesError>> = stream::iter(window.iter())
            .map(|batch| client.generate(batch))
            .buffered(concurrency)
            .collect()
            .await;

        for (batch, result) in window.iter().zip(results) {
            let notes = match result {
                Ok(notes) => notes,
                Err(e) => {
                    tracing::error!(teas = batch.len(), error = %e, "note batch failed");
                    summary.failed_batches += 1;
                    continue;
                }
            };
            summary.generated += notes.len();
            if notes.len() < batch.len() {
                tracing::warn!(
                    requested = batch.len(),
                    returned = notes.len(),
                    "model returned fewer notes than teas"
                );
            }

            if settings.dry_run {
                for note in notes.iter().take(DRY_RUN_PREVIEW) {
                    println!("\n{}\n  {}", note.tea_name, note.note);
                }
                continue;
            }

            for note in &notes {
                match teadb_db::upsert_tasting_note(
                    pool,
                    note.tea_id,
                    &note.note,
                    NOTE_ATTRIBUTION,
                    Some(client.model()),
                )
                .await
                {
                    Ok(()) => summary.saved += 1,
                    Err(e) => {
                        tracing::warn!(tea = %note.tea_name, error = %e, "failed to save tasting note");
                        summary.save_errors += 1;
                    }
                }
            }
        }
    }

    println!(
        "\nnotes: {} generated, {} saved, {} save errors, {}/{} batches failed",
        summary.generated,
        summary.saved,
        summary.save_errors,
        summary.failed_batches,
        summary.batches
    );
    if settings.dry_run {
        println!("dry run: nothing saved");
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
