//! Storage implementations.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::{StorageConfig, StorageType};
use crate::error::{EventLogError, Result};

mod event_log;

#[cfg(feature = "sql")]
pub mod schema;
#[cfg(feature = "sql")]
pub mod sql;

#[cfg(any(all(test, feature = "sql"), feature = "test-utils"))]
pub mod mock;

pub use event_log::{EventLog, EventStream};

#[cfg(feature = "sql")]
pub use sql::{SqlDatabase, SqlEventLog};

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresEventLog;

#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteEventLog;

#[cfg(feature = "mysql")]
pub use sql::mysql::MysqlEventLog;

#[cfg(any(all(test, feature = "sql"), feature = "test-utils"))]
pub use mock::MockEventLog;

/// Initialize storage based on configuration.
///
/// Connects a pool for the configured backend, applies the schema and
/// returns the event log. The pool lives as long as the returned log.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn EventLog>> {
    #[allow(unused_variables)]
    let timeout = config.query_timeout_ms.map(Duration::from_millis);

    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            info!("Storage: sqlite at {}", config.sqlite.path);

            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EventLogError::Config(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }

            let pool = sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&format!("sqlite:{}?mode=rwc", config.sqlite.path))
                .await
                .map_err(EventLogError::Connect)?;

            finish(SqliteEventLog::new(pool), timeout).await
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            info!("Storage: postgres");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.postgres.uri)
                .await
                .map_err(EventLogError::Connect)?;

            finish(PostgresEventLog::new(pool), timeout).await
        }
        #[cfg(feature = "mysql")]
        StorageType::Mysql => {
            info!("Storage: mysql");

            let pool = sqlx::mysql::MySqlPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.mysql.uri)
                .await
                .map_err(EventLogError::Connect)?;

            finish(MysqlEventLog::new(pool), timeout).await
        }
        #[allow(unreachable_patterns)]
        other => {
            error!("Storage backend {:?} requested but its feature is not enabled", other);
            Err(EventLogError::Config(format!(
                "storage backend {:?} not enabled in this build",
                other
            )))
        }
    }
}

/// Apply the deadline, ensure the schema, and erase the backend type.
#[cfg(feature = "sql")]
#[allow(dead_code)]
async fn finish<DB>(
    log: SqlEventLog<DB>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn EventLog>>
where
    DB: SqlDatabase,
    SqlEventLog<DB>: EventLog + 'static,
{
    let log = match timeout {
        Some(timeout) => log.with_timeout(timeout),
        None => log,
    };
    log.ensure_schema().await?;
    Ok(Arc::new(log))
}
