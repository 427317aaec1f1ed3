//! Database pool setup, schema migrations and liveness checks.
//!
//! SQLite is the default backend; Postgres is supported through the same URL
//! setting. The pool is built once in `main` and injected everywhere else.

use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::AppConfig;

/// Attempts made against a networked backend before giving up.
const NETWORK_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors raised while opening the pool.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database after {attempts} attempt(s): {source}")]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

fn is_sqlite(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
}

fn connect_options(cfg: &AppConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&cfg.database_url);
    opt.max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    // Recycling the only connection of `sqlite::memory:` would drop the database.
    if !is_sqlite(&cfg.database_url) {
        opt.idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800));
    }
    opt
}

/// Opens the connection pool described by `cfg`.
///
/// SQLite is opened once. Networked backends are retried with exponential
/// backoff so the service can start alongside a database that is still booting.
///
/// # Examples
///
/// ```no_run
/// use review_collector::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let db = init_pool(&AppConfig::default()).await?;
///     review_collector::db::run_migrations(&db).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.trim().is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "Database URL cannot be empty".to_string(),
        }
        .into());
    }

    let options = connect_options(cfg);
    let max_attempts = if is_sqlite(&cfg.database_url) {
        1
    } else {
        NETWORK_CONNECT_ATTEMPTS
    };
    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;

    loop {
        match Database::connect(options.clone()).await {
            Ok(db) => {
                info!(attempt, backend = ?db.get_database_backend(), "Connected to database");
                return Ok(db);
            }
            Err(source) if attempt >= max_attempts => {
                error!(attempts = attempt, error = %source, "Giving up connecting to database");
                return Err(DatabaseError::ConnectionFailed {
                    attempts: attempt,
                    source,
                }
                .into());
            }
            Err(error) => {
                warn!(attempt, %error, ?retry_delay, "Database connection failed, retrying");
                sleep(retry_delay).await;
                retry_delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Applies all pending schema migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .context("Failed to apply database migrations")?;

    let applied = Migrator::get_applied_migrations(db)
        .await
        .context("Failed to read applied migrations")?;
    info!(applied = applied.len(), "Database schema up to date");

    Ok(())
}

/// Round-trips to the database; fails on a closed or disconnected pool.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    db.ping().await.context("Database health check failed")
}
