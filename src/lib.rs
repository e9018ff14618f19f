//! eventlog - typed event-log persistence
//!
//! Persists application events (a code, a description, ordered key/value
//! metadata and a store-assigned timestamp) to a relational store and
//! retrieves them by exact code or by metadata containment.

#![cfg_attr(
    feature = "sqlite",
    doc = r#"
```no_run
# async fn example(pool: sqlx::SqlitePool) -> eventlog::Result<()> {
use eventlog::storage::{EventLog, SqliteEventLog};
use eventlog::{KeyValue, Metadata, NewEvent};
use futures::StreamExt;

let log = SqliteEventLog::new(pool);
log.ensure_schema().await?;

let metadata = Metadata::new().with("location", "Bournemouth");
log.insert(&NewEvent::new("meetup.begin", "Meetup has begun.", metadata)?)
    .await?;

let mut events = log.find_by_metadata(&KeyValue::new("location", "Bournemouth"));
while let Some(event) = events.next().await {
    println!("{}", event?);
}
# Ok(())
# }
```
"#
)]

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod metadata;
pub mod storage;
pub mod utils;

pub use error::{EventLogError, Result};
pub use event::{Event, NewEvent};
pub use metadata::{KeyValue, Metadata};
