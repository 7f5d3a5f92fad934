//! Repository for the `render_jobs` table.
//!
//! Only two writes exist: the creation insert and the terminal update.

use sqlx::SqlitePool;

use crate::models::render_job::RenderJobRow;

/// Column list for `render_jobs` queries.
const COLUMNS: &str = "\
    id, created_at, mode, width, height, max_iter, samples, \
    workers, chunk_size, status, progress, duration_ms, pixels_per_second";

/// Number of rows returned by the history listing.
pub const HISTORY_LIMIT: i64 = 30;

/// Provides persistence operations for render job metadata.
pub struct RenderJobRepo;

impl RenderJobRepo {
    /// Insert a newly created job.
    pub async fn insert(pool: &SqlitePool, row: &RenderJobRow) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO render_jobs ({COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&query)
            .bind(&row.id)
            .bind(row.created_at)
            .bind(&row.mode)
            .bind(row.width)
            .bind(row.height)
            .bind(row.max_iter)
            .bind(row.samples)
            .bind(row.workers)
            .bind(row.chunk_size)
            .bind(&row.status)
            .bind(row.progress)
            .bind(row.duration_ms)
            .bind(row.pixels_per_second)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Write the terminal status, progress, duration and throughput.
    ///
    /// Returns `false` if no row matched the id.
    pub async fn update_terminal(
        pool: &SqlitePool,
        row: &RenderJobRow,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE render_jobs \
             SET status = ?, progress = ?, duration_ms = ?, pixels_per_second = ? \
             WHERE id = ?",
        )
        .bind(&row.status)
        .bind(row.progress)
        .bind(row.duration_ms)
        .bind(row.pixels_per_second)
        .bind(&row.id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a job by id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: &str,
    ) -> Result<Option<RenderJobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM render_jobs WHERE id = ?");
        sqlx::query_as::<_, RenderJobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently created jobs, newest first.
    ///
    /// Timestamps are stored as RFC 3339 text with a variable number of
    /// fractional digits, so ordering goes through `julianday` rather than
    /// string comparison. Ties fall back to insertion order.
    pub async fn list_recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<RenderJobRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM render_jobs \
             ORDER BY julianday(created_at) DESC, rowid DESC \
             LIMIT ?"
        );
        sqlx::query_as::<_, RenderJobRow>(&query)
            .bind(limit.clamp(1, HISTORY_LIMIT))
            .fetch_all(pool)
            .await
    }
}
