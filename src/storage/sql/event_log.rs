//! Unified SQL EventLog implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use sea_query::{Expr, Query, SelectStatement};
use sea_query_binder::SqlxValues;

use super::SqlDatabase;
use crate::error::{EventLogError, Result};
use crate::storage::schema::EventsLog;

/// SQL-based implementation of EventLog.
///
/// Holds a clone of the process-owned pool; it never closes it. Works with
/// any SQL database that implements the `SqlDatabase` trait.
pub struct SqlEventLog<DB: SqlDatabase> {
    pool: DB::Pool,
    timeout: Option<Duration>,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlEventLog<DB> {
    /// Create a new SQL event log with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            timeout: None,
            _marker: PhantomData,
        }
    }

    /// Bound every store round-trip by `timeout`.
    ///
    /// For metadata streams the limit applies to each row fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }

    /// SELECT of the four event columns, metadata read back as text.
    fn select_events() -> SelectStatement {
        Query::select()
            .columns([EventsLog::Code, EventsLog::Description])
            .expr_as(DB::metadata_column(), EventsLog::Metadata)
            .column(EventsLog::CreatedAt)
            .from(EventsLog::Table)
            .to_owned()
    }

    fn find_by_code_sql(code: &str) -> (String, SqlxValues) {
        let stmt = Self::select_events()
            .and_where(Expr::col(EventsLog::Code).eq(code))
            .limit(1)
            .to_owned();
        DB::build_select(stmt)
    }

    fn find_by_metadata_sql(pair: String) -> (String, SqlxValues) {
        let stmt = Self::select_events()
            .and_where(DB::metadata_contains(pair))
            .to_owned();
        DB::build_select(stmt)
    }

    fn insert_sql(code: &str, description: &str, document: String) -> (String, SqlxValues) {
        let stmt = Query::insert()
            .into_table(EventsLog::Table)
            .columns([EventsLog::Code, EventsLog::Description, EventsLog::Metadata])
            .values_panic([
                code.into(),
                description.into(),
                DB::metadata_value(document),
            ])
            .to_owned();
        DB::build_insert(stmt)
    }
}

/// Await `fut`, failing with `Timeout` once `limit` elapses.
async fn bounded<T, F>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| EventLogError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Macro to implement EventLog for a specific SQL backend.
///
/// This eliminates duplication between the PostgreSQL, SQLite and MySQL
/// implementations while maintaining full type safety.
macro_rules! impl_event_log {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlEventLog<$db_type> {
            fn decode_row(row: &$row_type) -> crate::error::Result<crate::event::Event> {
                use sqlx::Row;

                let code: String = row.try_get("code").map_err(EventLogError::Query)?;
                let description: String =
                    row.try_get("description").map_err(EventLogError::Query)?;
                let document: String = row.try_get("metadata").map_err(EventLogError::Query)?;
                let created_at: chrono::DateTime<chrono::Utc> =
                    row.try_get("created_at").map_err(EventLogError::Query)?;

                let metadata = crate::codec::decode_str(&document).map_err(|source| {
                    EventLogError::Decode {
                        code: code.clone(),
                        source,
                    }
                })?;

                Ok(crate::event::Event {
                    code,
                    description,
                    metadata,
                    created_at,
                })
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::EventLog for SqlEventLog<$db_type> {
            async fn ensure_schema(&self) -> crate::error::Result<()> {
                let pool = &self.pool;
                bounded(
                    self.timeout,
                    super::migrations::apply(
                        <$db_type as SqlDatabase>::NAME,
                        <$db_type as SqlDatabase>::MIGRATIONS,
                        |statement| async move {
                            sqlx::query(statement).execute(pool).await.map(|_| ())
                        },
                    ),
                )
                .await
            }

            async fn insert(&self, event: &crate::event::NewEvent) -> crate::error::Result<()> {
                event.validate()?;

                let document =
                    crate::codec::encode(&event.metadata).map_err(EventLogError::Encode)?;
                let (sql, values) = Self::insert_sql(&event.code, &event.description, document);

                bounded(self.timeout, async {
                    sqlx::query_with(&sql, values)
                        .execute(&self.pool)
                        .await
                        .map_err(EventLogError::Insert)
                })
                .await?;

                tracing::debug!(
                    backend = <$db_type as SqlDatabase>::NAME,
                    code = %event.code,
                    pairs = event.metadata.len(),
                    "Inserted event"
                );
                Ok(())
            }

            async fn find_by_code(&self, code: &str) -> crate::error::Result<crate::event::Event> {
                let (sql, values) = Self::find_by_code_sql(code);

                let row = bounded(self.timeout, async {
                    sqlx::query_with(&sql, values)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(EventLogError::Query)
                })
                .await?;

                match row {
                    Some(row) => Self::decode_row(&row),
                    None => Err(EventLogError::NotFound {
                        code: code.to_string(),
                    }),
                }
            }

            fn find_by_metadata<'a>(
                &'a self,
                pair: &crate::metadata::KeyValue,
            ) -> crate::storage::EventStream<'a> {
                use futures::TryStreamExt;

                let encoded = crate::codec::encode_pair(pair);
                let limit = self.timeout;

                Box::pin(async_stream::stream! {
                    let document = match encoded {
                        Ok(document) => document,
                        Err(e) => {
                            yield Err(EventLogError::Encode(e));
                            return;
                        }
                    };
                    let (sql, values) = Self::find_by_metadata_sql(document);
                    let mut rows = sqlx::query_with(&sql, values).fetch(&self.pool);
                    let mut count = 0usize;

                    loop {
                        let next = match limit {
                            Some(limit) => match tokio::time::timeout(limit, rows.try_next()).await {
                                Ok(next) => next,
                                Err(_) => {
                                    yield Err(EventLogError::Timeout(limit));
                                    break;
                                }
                            },
                            None => rows.try_next().await,
                        };

                        match next {
                            Ok(Some(row)) => {
                                count += 1;
                                yield Self::decode_row(&row);
                            }
                            Ok(None) => break,
                            Err(e) => {
                                yield Err(EventLogError::Query(e));
                                break;
                            }
                        }
                    }

                    tracing::debug!(
                        backend = <$db_type as SqlDatabase>::NAME,
                        rows = count,
                        "Metadata query finished"
                    );
                })
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_event_log!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_event_log!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
impl_event_log!(super::mysql::Mysql, sqlx::mysql::MySqlRow, "mysql");
