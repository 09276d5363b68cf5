//! SQLite storage handle
//!
//! Features:
//! - One connection, kept open for the life of the handle
//! - Schema applied atomically on open
//! - Synchronous API over a private current-thread runtime
//!
//! Must not be used from inside another async runtime (`block_on` would panic).

use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::{Builder, Runtime};

use crate::error::{ScoreError, ScoreResult};

const SCHEMA: &str = include_str!("schema.sql");

pub struct Database {
    runtime: Runtime,
    pool: SqlitePool,
    location: String,
}

impl Database {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: &Path) -> ScoreResult<Self> {
        let location = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| open_error(&location, sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options, location)
    }

    /// Private database that disappears with the handle
    pub fn open_in_memory() -> ScoreResult<Self> {
        let location = "sqlite::memory:".to_string();
        let options =
            SqliteConnectOptions::from_str(&location).map_err(|e| open_error(&location, e))?;
        Self::connect(options, location)
    }

    fn connect(options: SqliteConnectOptions, location: String) -> ScoreResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| open_error(&location, sqlx::Error::Io(e)))?;

        // A single long-lived connection: writes are serialized and an
        // in-memory database survives between calls.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None::<Duration>)
                    .max_lifetime(None::<Duration>)
                    .connect_with(options),
            )
            .map_err(|e| open_error(&location, e))?;

        if let Err(e) = runtime.block_on(apply_schema(&pool, SCHEMA)) {
            log::error!("Scoreboard schema failed at {}: {}", location, e);
            return Err(open_error(&location, e));
        }

        log::info!("Scoreboard opened at {}", location);
        Ok(Self {
            runtime,
            pool,
            location,
        })
    }

    /// Run a query future to completion on the storage runtime
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
        log::debug!("Scoreboard closed at {}", self.location);
    }
}

fn open_error(location: &str, source: sqlx::Error) -> ScoreError {
    ScoreError::StorageOpen {
        path: location.to_string(),
        source,
    }
}

async fn apply_schema(pool: &SqlitePool, schema: &str) -> Result<(), sqlx::Error> {
    // Rolled back on drop if any statement fails
    let mut tx = pool.begin().await?;
    for sql in split_sql(schema) {
        sqlx::query(&sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Split a trusted schema file into statements, dropping `--` comments
fn split_sql(raw: &str) -> Vec<String> {
    let code: String = raw
        .lines()
        .map(|line| match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql() {
        let statements = split_sql(SCHEMA);
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS Scoreboard"));
        assert!(statements.iter().all(|s| !s.contains("--")));
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.sqlite");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.location(), path.display().to_string());
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.sqlite");

        drop(Database::open(&path).unwrap());
        assert!(Database::open(&path).is_ok());
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::open(dir.path()).err().unwrap();
        assert!(matches!(err, ScoreError::StorageOpen { .. }));
    }
}
