//! Database operations for `tasting_notes`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A catalog tea that still needs an editorial note.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeaForNotes {
    pub id: i64,
    pub name: String,
    pub brand_name: String,
    pub tea_type: String,
    pub description: Option<String>,
    pub flavor_notes: Vec<String>,
    pub steep_temp_f: Option<i32>,
    pub steep_time_min: Option<i32>,
    pub steep_time_max: Option<i32>,
}

/// A row from the `tasting_notes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TastingNoteRow {
    pub id: i64,
    pub tea_id: i64,
    pub note_text: String,
    pub source_attribution: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Imported teas with a description and no tasting note, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_teas_without_notes(
    pool: &PgPool,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<TeaForNotes>, DbError> {
    let rows = sqlx::query_as::<_, TeaForNotes>(
        "SELECT t.id, t.name, t.brand_name, t.tea_type, t.description, t.flavor_notes, \
                t.steep_temp_f, t.steep_time_min, t.steep_time_max \
         FROM teas t \
         WHERE t.is_custom = false \
           AND t.description IS NOT NULL \
           AND NOT EXISTS (SELECT 1 FROM tasting_notes n WHERE n.tea_id = t.id) \
         ORDER BY t.name, t.id \
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Writes the editorial note for `tea_id`, replacing any earlier one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails, including when `tea_id`
/// names no tea.
pub async fn upsert_tasting_note(
    pool: &PgPool,
    tea_id: i64,
    note_text: &str,
    source_attribution: &str,
    model: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO tasting_notes (tea_id, note_text, source_attribution, model) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (tea_id) DO UPDATE SET \
             note_text          = EXCLUDED.note_text, \
             source_attribution = EXCLUDED.source_attribution, \
             model              = EXCLUDED.model, \
             updated_at         = NOW()",
    )
    .bind(tea_id)
    .bind(note_text)
    .bind(source_attribution)
    .bind(model)
    .execute(pool)
    .await?;

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tasting_note(pool: &PgPool, tea_id: i64) -> Result<Option<TastingNoteRow>, DbError> {
    let row = sqlx::query_as::<_, TastingNoteRow>(
        "SELECT id, tea_id, note_text, source_attribution, model, created_at, updated_at \
         FROM tasting_notes \
         WHERE tea_id = $1",
    )
    .bind(tea_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
