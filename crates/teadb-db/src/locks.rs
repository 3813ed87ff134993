//! Per-vendor run coordination through Postgres session advisory locks.
//!
//! The lock lives on one pooled connection for as long as the guard does.
//! Session locks outlive transactions, so the guard must hand its connection
//! back only after unlocking; a guard dropped without [`VendorLock::release`]
//! closes its connection instead, which ends the session and frees the lock.

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use crate::DbError;

#[derive(Debug)]
pub struct VendorLock {
    name: String,
    conn: Option<PoolConnection<Postgres>>,
}

impl VendorLock {
    /// Tries to take the lock named `name` without waiting.
    ///
    /// Returns `None` when another session holds it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the
    /// lock query fails.
    pub async fn try_acquire(pool: &PgPool, name: &str) -> Result<Option<Self>, DbError> {
        let mut conn = pool.acquire().await?;
        let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock(hashtext($1))")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

        if !acquired {
            return Ok(None);
        }

        tracing::debug!(lock = name, "advisory lock acquired");
        Ok(Some(Self {
            name: name.to_owned(),
            conn: Some(conn),
        }))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unlocks and returns the connection to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the unlock query fails; the connection is
    /// then closed, which releases the lock anyway.
    pub async fn release(mut self) -> Result<(), DbError> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        match sqlx::query_scalar::<_, bool>("SELECT pg_advisory_unlock(hashtext($1))")
            .bind(&self.name)
            .fetch_one(&mut *conn)
            .await
        {
            Ok(_) => {
                tracing::debug!(lock = %self.name, "advisory lock released");
                Ok(())
            }
            Err(e) => {
                conn.close_on_drop();
                Err(e.into())
            }
        }
    }
}

impl Drop for VendorLock {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.as_mut() {
            conn.close_on_drop();
        }
    }
}
