use crate::error::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the SQLite store. In-memory databases live only as long as their
/// connection, so they get a single connection that is never recycled.
/// File databases run in WAL mode so readers never block the writer.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// SQLite admits a single writer, and a deferred transaction that reads
/// before it writes fails outright when it cannot upgrade its lock. Every
/// write goes through this handle so writers queue instead.
#[derive(Clone, Default)]
pub struct WriteLock(Arc<Mutex<()>>);

/// A write transaction that holds the lock until it is committed or dropped.
pub struct WriteTransaction<'a> {
    // Dropped before the guard, so a rollback finishes while still locked.
    pub tx: Transaction<'static, Sqlite>,
    _guard: MutexGuard<'a, ()>,
}

impl WriteLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin(&self, pool: &SqlitePool) -> Result<WriteTransaction<'_>> {
        let guard = self.0.lock().await;
        let tx = pool.begin().await?;
        Ok(WriteTransaction { tx, _guard: guard })
    }

    /// Holds the lock for a single autocommit statement.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

impl WriteTransaction<'_> {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
