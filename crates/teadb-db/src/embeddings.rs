//! Tea embedding vectors stored on `teas`.

use sqlx::PgPool;

use crate::DbError;

/// The fields a tea's embedding text is built from.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeaForEmbedding {
    pub id: i64,
    pub name: String,
    pub tea_type: String,
    pub description: Option<String>,
    pub flavor_notes: Vec<String>,
    pub origin: Option<String>,
}

/// Teas with no stored embedding, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_teas_without_embedding(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<TeaForEmbedding>, DbError> {
    let rows = sqlx::query_as::<_, TeaForEmbedding>(
        "SELECT id, name, tea_type, description, flavor_notes, origin \
         FROM teas \
         WHERE embedding IS NULL \
         ORDER BY id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stores `embedding` for `tea_id` with the model that produced it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no tea has `tea_id`, or
/// [`DbError::Sqlx`] if the write fails.
pub async fn set_tea_embedding(
    pool: &PgPool,
    tea_id: i64,
    embedding: &[f32],
    model: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE teas \
         SET embedding = $2, embedding_model = $3, embedded_at = NOW() \
         WHERE id = $1",
    )
    .bind(tea_id)
    .bind(embedding)
    .bind(model)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tea_embedding(pool: &PgPool, tea_id: i64) -> Result<Option<Vec<f32>>, DbError> {
    let embedding = sqlx::query_scalar::<_, Option<Vec<f32>>>(
        "SELECT embedding FROM teas WHERE id = $1",
    )
    .bind(tea_id)
    .fetch_optional(pool)
    .await?;

    Ok(embedding.flatten())
}
