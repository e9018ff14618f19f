//! EventLog trait definition.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::event::{Event, NewEvent};
use crate::metadata::KeyValue;

/// Lazy, forward-only sequence of events returned by metadata queries.
///
/// Each item is decoded independently: a row whose metadata is corrupt
/// yields `Err(EventLogError::Decode)` and later rows are still produced.
/// Dropping the stream releases any connection it holds.
pub type EventStream<'a> = BoxStream<'a, Result<Event>>;

/// Interface for event log persistence.
///
/// Implementations borrow a store handle that the process owns; none of them
/// open or close it.
///
/// Implementations:
/// - `SqliteEventLog`: SQLite storage
/// - `PostgresEventLog`: PostgreSQL storage
/// - `MysqlEventLog`: MySQL storage
/// - `MockEventLog`: In-memory mock for testing
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Bring the schema to the state the other operations need.
    ///
    /// Idempotent. Must complete successfully before any other call.
    async fn ensure_schema(&self) -> Result<()>;

    /// Append an event. `created_at` is assigned by the store.
    async fn insert(&self, event: &NewEvent) -> Result<()>;

    /// Retrieve an event by exact code.
    ///
    /// Codes are not unique. When several rows share a code, the first row in
    /// the store's default result order is returned; callers must not rely on
    /// which one that is.
    async fn find_by_code(&self, code: &str) -> Result<Event>;

    /// Stream every event whose metadata contains `pair` (key and value both
    /// equal). The predicate is evaluated by the store.
    fn find_by_metadata<'a>(&'a self, pair: &KeyValue) -> EventStream<'a>;
}
