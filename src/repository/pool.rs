//! Unified database connection pool supporting SQLite and PostgreSQL.
//!
//! The backend is chosen at runtime from the database URL.

use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;

#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::deadpool::Pool as DeadPool;
#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, RecyclingMethod};
#[cfg(feature = "postgres")]
use diesel_async::AsyncPgConnection;

use super::util::to_diesel_error;

/// Diesel error type alias.
pub type DbError = diesel::result::Error;

/// Async SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Async PostgreSQL connection type.
#[cfg(feature = "postgres")]
pub type PgConn = deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Default maximum number of pooled PostgreSQL connections.
pub const DEFAULT_POOL_SIZE: usize = 25;

/// Returns true for URLs that select the PostgreSQL backend.
pub fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// SQLite connection pool (lightweight - creates connections on demand).
#[derive(Clone)]
pub struct SqlitePool {
    database_url: String,
}

impl SqlitePool {
    /// Create a new SQLite pool.
    ///
    /// `sqlite:///name.db` is relative to the working directory and
    /// `sqlite:////abs/name.db` is absolute. `sqlite:path` and bare paths are
    /// used as given.
    pub fn new(database_url: &str) -> Self {
        let path = if let Some(abs) = database_url.strip_prefix("sqlite:////") {
            format!("/{abs}")
        } else {
            database_url
                .strip_prefix("sqlite:///")
                .or_else(|| database_url.strip_prefix("sqlite://"))
                .or_else(|| database_url.strip_prefix("sqlite:"))
                .unwrap_or(database_url)
                .to_string()
        };
        Self {
            database_url: path,
        }
    }

    /// Create pool from a file path.
    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    /// Get a connection.
    pub async fn get(&self) -> Result<SqliteConn, DbError> {
        SqliteConn::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)
    }

    /// Get the database path.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// PostgreSQL connection pool.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgPool {
    pool: DeadPool<AsyncPgConnection>,
}

#[cfg(feature = "postgres")]
impl PgPool {
    /// Create a new PostgreSQL pool. Connections are verified before reuse.
    pub fn new(database_url: &str, max_size: usize) -> Result<Self, DbError> {
        let mut manager_config = ManagerConfig::<AsyncPgConnection>::default();
        manager_config.recycling_method = RecyclingMethod::Verified;
        let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            database_url,
            manager_config,
        );
        let pool = DeadPool::builder(config)
            .max_size(max_size)
            .build()
            .map_err(to_diesel_error)?;
        Ok(Self { pool })
    }

    /// Get a connection.
    pub async fn get(&self) -> Result<PgConn, DbError> {
        self.pool.get().await.map_err(to_diesel_error)
    }
}

/// Unified database pool that supports both SQLite and PostgreSQL.
#[derive(Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

impl DbPool {
    /// Create a pool from a database URL.
    ///
    /// - `postgres://` or `postgresql://` → PostgreSQL (requires the `postgres` feature)
    /// - Everything else → SQLite
    pub fn from_url(url: &str, max_size: usize) -> Result<Self, DbError> {
        if is_postgres_url(url) {
            #[cfg(feature = "postgres")]
            return Ok(DbPool::Postgres(PgPool::new(url, max_size)?));

            #[cfg(not(feature = "postgres"))]
            {
                let _ = max_size;
                return Err(to_diesel_error(
                    "PostgreSQL URL given but booksum was built without the `postgres` feature",
                ));
            }
        }

        Ok(DbPool::Sqlite(SqlitePool::new(url)))
    }

    /// Create a SQLite pool from a file path.
    pub fn sqlite_from_path(path: &Path) -> Self {
        DbPool::Sqlite(SqlitePool::from_path(path))
    }
}

/// Macro for running database operations on either backend.
///
/// The body is expanded once per backend, so the same Diesel DSL code runs on
/// both SQLite and PostgreSQL.
///
/// # Example
/// ```ignore
/// with_conn!(self.pool, conn => {
///     summary::table.load::<SummaryRow>(&mut conn).await
/// })
/// ```
#[macro_export]
macro_rules! with_conn {
    ($pool:expr, $conn:ident => $body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                let mut $conn = pool.get().await?;
                $body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                let mut $conn = pool.get().await?;
                $body
            }
        }
    }};
}

/// Macro for running database operations that need different SQL per backend.
///
/// # Example
/// ```ignore
/// with_conn_split!(self.pool,
///     sqlite: conn => { conn.batch_execute(SQLITE_DDL).await },
///     postgres: conn => { diesel::sql_query(PG_DDL).execute(&mut conn).await.map(|_| ()) }
/// )
/// ```
#[macro_export]
macro_rules! with_conn_split {
    ($pool:expr, sqlite: $sqlite_conn:ident => $sqlite_body:expr, postgres: $pg_conn:ident => $pg_body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                let mut $sqlite_conn = pool.get().await?;
                $sqlite_body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                let mut $pg_conn = pool.get().await?;
                $pg_body
            }
        }
    }};
}

#[allow(unused_imports)]
pub use with_conn;
#[allow(unused_imports)]
pub use with_conn_split;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_detection() {
        assert!(matches!(
            DbPool::from_url("/path/to/db.sqlite", 5).unwrap(),
            DbPool::Sqlite(_)
        ));
        assert!(matches!(
            DbPool::from_url("sqlite:/path/to/db", 5).unwrap(),
            DbPool::Sqlite(_)
        ));

        #[cfg(feature = "postgres")]
        {
            assert!(matches!(
                DbPool::from_url("postgres://localhost/test", 5).unwrap(),
                DbPool::Postgres(_)
            ));
            assert!(matches!(
                DbPool::from_url("postgresql://localhost/test", 5).unwrap(),
                DbPool::Postgres(_)
            ));
        }

        #[cfg(not(feature = "postgres"))]
        assert!(DbPool::from_url("postgres://localhost/test", 5).is_err());
    }

    #[test]
    fn test_sqlite_url_paths() {
        let cases = [
            ("sqlite:///book_summaries.db", "book_summaries.db"),
            ("sqlite:///instance/book_summaries.db", "instance/book_summaries.db"),
            ("sqlite:////tmp/books.db", "/tmp/books.db"),
            ("sqlite:/tmp/books.db", "/tmp/books.db"),
            ("sqlite:books.db", "books.db"),
            ("/var/lib/booksum/books.db", "/var/lib/booksum/books.db"),
            ("books.db", "books.db"),
        ];
        for (url, path) in cases {
            assert_eq!(SqlitePool::new(url).database_url(), path, "{url}");
        }
    }

    #[tokio::test]
    async fn test_four_slash_url_opens_absolute_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abs.db");
        // The absolute path supplies the fourth slash.
        let url = format!("sqlite:///{}", path.display());
        let pool = SqlitePool::new(&url);
        assert_eq!(pool.database_url(), path.display().to_string());
        pool.get().await.unwrap();
        assert!(dir.path().join("abs.db").exists());
    }
}
