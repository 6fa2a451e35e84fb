use crate::db::schema::SCHEMA;
use crate::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

/// Shared SQLite handle.
///
/// The pool is created lazily: no file is opened and no connection exists
/// until the first statement runs. Every statement issued through this type
/// is counted.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    issued: Arc<AtomicU64>,
}

impl Database {
    /// Parses `database_url` and builds the pool without connecting.
    pub fn connect(database_url: &str) -> Result<Self, AppError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new().connect_lazy_with(connect_opts);
        debug!(database_url, "database handle created");

        Ok(Self {
            pool,
            issued: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Opens the database (creating the file if missing) and applies
    /// [`SCHEMA`]. Safe to call more than once.
    pub async fn create_all(&self) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&mut *conn).await?;
            self.issued.fetch_add(1, Ordering::Relaxed);
        }
        info!(statements = SCHEMA.len(), "database schema ready");
        Ok(())
    }

    /// Round-trips a trivial statement.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        self.issued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of statements issued through this handle since it was created.
    pub fn queries_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Connections currently held by the pool, idle or in use.
    pub fn open_connections(&self) -> u32 {
        self.pool.size()
    }

    /// Closes every pooled connection; later calls fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database handle closed");
    }
}
