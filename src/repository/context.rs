//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool and hands out repositories.

use std::path::Path;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};

use super::pool::{DbError, DbPool};
use super::summary::SummaryRepository;
use crate::schema::summary;
use crate::{with_conn, with_conn_split};

/// Optional columns that older databases may be missing, with their SQL types.
const NULLABLE_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT"),
    ("pdf_text", "TEXT"),
    ("short_summary", "TEXT"),
    ("brief_summary", "TEXT"),
    ("detailed_summary", "TEXT"),
    ("page_count", "INTEGER"),
];

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("postgres://localhost/books", 25)?;
/// ctx.init_schema().await?;
/// let recent = ctx.summaries().recent(5).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database file path (SQLite only).
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: DbPool::sqlite_from_path(db_path),
        }
    }

    /// Create a context from a database URL.
    ///
    /// Supports:
    /// - SQLite: file paths or `sqlite:` URLs
    /// - PostgreSQL: `postgres://` or `postgresql://` URLs
    pub fn from_url(url: &str, pool_size: usize) -> Result<Self, DbError> {
        Ok(Self {
            pool: DbPool::from_url(url, pool_size)?,
        })
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get a summary repository.
    pub fn summaries(&self) -> SummaryRepository {
        SummaryRepository::new(self.pool.clone())
    }

    /// Create the `summary` table if needed and bring older tables up to date.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.migrate().await.map(|_| ())
    }

    /// Create the table, add any missing nullable columns and backfill
    /// missing creation times. Returns the names of the columns added.
    pub async fn migrate(&self) -> Result<Vec<String>, DbError> {
        with_conn_split!(self.pool,
            sqlite: conn => {
                conn.batch_execute(include_str!("schema_sqlite.sql")).await?
            },
            postgres: conn => {
                for stmt in include_str!("schema_postgres.sql").split(';') {
                    let stmt = stmt.trim();
                    if !stmt.is_empty() {
                        diesel::sql_query(stmt).execute(&mut conn).await?;
                    }
                }

                // Older databases store created_at as a timestamp.
                let types: Vec<ColumnType> = diesel::sql_query(
                    "SELECT data_type::text AS data_type FROM information_schema.columns \
                     WHERE table_name = 'summary' AND column_name = 'created_at'",
                )
                .load(&mut conn)
                .await?;
                if types.iter().any(|t| t.data_type.starts_with("timestamp")) {
                    diesel::sql_query(
                        "ALTER TABLE summary ALTER COLUMN created_at TYPE TEXT \
                         USING to_char(created_at, 'YYYY-MM-DD HH24:MI:SS.US')",
                    )
                    .execute(&mut conn)
                    .await?;
                    tracing::info!("Converted summary.created_at to text");
                }
            }
        );

        let existing = self.list_columns().await?;
        let mut added = Vec::new();
        for (column, sql_type) in NULLABLE_COLUMNS {
            if existing.iter().any(|c| c == column) {
                continue;
            }
            let stmt = format!("ALTER TABLE summary ADD COLUMN {column} {sql_type}");
            with_conn!(self.pool, conn => {
                diesel::sql_query(stmt.as_str()).execute(&mut conn).await?
            });
            tracing::info!("Added missing column summary.{}", column);
            added.push(column.to_string());
        }

        let now = Utc::now().to_rfc3339();
        let backfilled = with_conn!(self.pool, conn => {
            diesel::update(summary::table.filter(summary::created_at.is_null()))
                .set(summary::created_at.eq(&now))
                .execute(&mut conn)
                .await?
        });
        if backfilled > 0 {
            tracing::info!("Backfilled created_at on {} rows", backfilled);
        }

        Ok(added)
    }

    /// Column names of the `summary` table.
    pub async fn list_columns(&self) -> Result<Vec<String>, DbError> {
        with_conn_split!(self.pool,
            sqlite: conn => {
                let rows: Vec<ColumnName> =
                    diesel::sql_query("SELECT name FROM pragma_table_info('summary')")
                        .load(&mut conn)
                        .await?;
                Ok(rows.into_iter().map(|r| r.name).collect())
            },
            postgres: conn => {
                let rows: Vec<ColumnName> = diesel::sql_query(
                    "SELECT column_name::text AS name FROM information_schema.columns \
                     WHERE table_name = 'summary'",
                )
                .load(&mut conn)
                .await?;
                Ok(rows.into_iter().map(|r| r.name).collect())
            }
        )
    }
}

#[derive(diesel::QueryableByName)]
struct ColumnName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

#[cfg(feature = "postgres")]
#[derive(diesel::QueryableByName)]
struct ColumnType {
    #[diesel(sql_type = diesel::sql_types::Text)]
    data_type: String,
}

/// Layout of databases created before extracted text was stored.
#[cfg(test)]
pub(crate) async fn create_legacy_table(pool: &DbPool) -> Result<(), DbError> {
    with_conn!(pool, conn => {
        conn.batch_execute(
            "CREATE TABLE summary (
                id INTEGER NOT NULL,
                filename VARCHAR(255) NOT NULL,
                title VARCHAR(255),
                short_summary TEXT,
                brief_summary TEXT,
                detailed_summary TEXT,
                page_count INTEGER,
                created_at DATETIME,
                PRIMARY KEY (id)
            );
            INSERT INTO summary (filename, title, short_summary, page_count, created_at)
                VALUES ('old.pdf', 'Old', 'kept', 12, '2024-03-01 10:30:00.000000');
            INSERT INTO summary (filename, title, page_count, created_at)
                VALUES ('untitled_notes.pdf', NULL, 3, NULL);",
        )
        .await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));

        ctx.init_schema().await.unwrap();
        ctx.init_schema().await.unwrap();

        let columns = ctx.list_columns().await.unwrap();
        assert!(columns.contains(&"pdf_text".to_string()));
        assert!(columns.contains(&"detailed_summary".to_string()));
        assert_eq!(ctx.summaries().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migrate_upgrades_legacy_table_in_place() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("book_summaries.db"));
        create_legacy_table(ctx.pool()).await.unwrap();

        let added = ctx.migrate().await.unwrap();
        assert_eq!(added, vec!["pdf_text".to_string()]);
        assert!(ctx.migrate().await.unwrap().is_empty());

        let records = ctx.summaries().recent(5).await.unwrap();
        assert_eq!(records.len(), 2);

        let old = records.iter().find(|r| r.filename == "old.pdf").unwrap();
        assert!(old.pdf_text.is_none());
        assert_eq!(old.short_summary.as_deref(), Some("kept"));
        assert_eq!(old.page_count, Some(12));
        assert_eq!(
            old.created_at.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-01 10:30"
        );

        // New uploads land in the same table.
        let id = ctx.summaries().create("new.pdf", "New", "text", 1).await.unwrap();
        assert!(id > old.id);
        assert_eq!(ctx.summaries().count().await.unwrap(), 3);
    }
}
