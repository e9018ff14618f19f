//! Mock EventLog implementation for testing.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures::{stream, StreamExt};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::codec;
use crate::error::{EventLogError, Result};
use crate::event::{Event, NewEvent};
use crate::metadata::KeyValue;
use crate::storage::{EventLog, EventStream};

/// A row as the mock stores it: metadata kept as its encoded document so
/// corrupt documents can be planted with [`MockEventLog::insert_raw`].
#[derive(Clone)]
struct StoredRow {
    code: String,
    description: String,
    metadata: String,
    created_at: DateTime<Utc>,
}

impl StoredRow {
    fn decode(&self) -> Result<Event> {
        let metadata =
            codec::decode_str(&self.metadata).map_err(|source| EventLogError::Decode {
                code: self.code.clone(),
                source,
            })?;
        Ok(Event {
            code: self.code.clone(),
            description: self.description.clone(),
            metadata,
            created_at: self.created_at,
        })
    }
}

/// Mock event log that stores rows in memory, in insertion order.
#[derive(Default)]
pub struct MockEventLog {
    rows: RwLock<Vec<StoredRow>>,
    schema_applied: RwLock<u32>,
    fail_on_insert: RwLock<bool>,
    fail_on_query: RwLock<bool>,
}

impl MockEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }

    /// Store a row with an arbitrary metadata document, bypassing the codec.
    pub async fn insert_raw(&self, code: &str, description: &str, metadata: &str) {
        self.rows.write().await.push(StoredRow {
            code: code.to_string(),
            description: description.to_string(),
            metadata: metadata.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        });
    }

    /// Number of times `ensure_schema` has run.
    pub async fn schema_applied(&self) -> u32 {
        *self.schema_applied.read().await
    }

    pub async fn stored_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

/// JSON containment with the same rules as MySQL's `JSON_CONTAINS`: objects
/// match when every candidate member is contained in the target's member of
/// the same name, arrays when every candidate element is contained in some
/// target element, and a non-array candidate is contained in an array when
/// any element contains it.
fn json_contains(target: &Value, candidate: &Value) -> bool {
    match (target, candidate) {
        (Value::Object(target), Value::Object(candidate)) => {
            candidate.iter().all(|(key, value)| {
                target
                    .get(key)
                    .is_some_and(|member| json_contains(member, value))
            })
        }
        (Value::Array(target), Value::Array(candidate)) => candidate
            .iter()
            .all(|wanted| target.iter().any(|element| json_contains(element, wanted))),
        (Value::Array(target), candidate) => {
            target.iter().any(|element| json_contains(element, candidate))
        }
        (target, candidate) => target == candidate,
    }
}

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("mock event log failure".to_string())
}

#[async_trait]
impl EventLog for MockEventLog {
    async fn ensure_schema(&self) -> Result<()> {
        *self.schema_applied.write().await += 1;
        Ok(())
    }

    async fn insert(&self, event: &NewEvent) -> Result<()> {
        event.validate()?;
        if *self.fail_on_insert.read().await {
            return Err(EventLogError::Insert(mock_failure()));
        }

        let document = codec::encode(&event.metadata).map_err(EventLogError::Encode)?;
        self.insert_raw(&event.code, &event.description, &document).await;
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Event> {
        if *self.fail_on_query.read().await {
            return Err(EventLogError::Query(mock_failure()));
        }

        let rows = self.rows.read().await;
        match rows.iter().find(|row| row.code == code) {
            Some(row) => row.decode(),
            None => Err(EventLogError::NotFound {
                code: code.to_string(),
            }),
        }
    }

    fn find_by_metadata<'a>(&'a self, pair: &KeyValue) -> EventStream<'a> {
        let candidate = serde_json::to_value(pair);

        Box::pin(
            stream::once(async move {
                if *self.fail_on_query.read().await {
                    return vec![Err(EventLogError::Query(mock_failure()))];
                }
                let candidate = match candidate {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        return vec![Err(EventLogError::Encode(codec::CodecError::Encode(e)))]
                    }
                };

                let rows = self.rows.read().await;
                rows.iter()
                    .filter(|row| {
                        // Malformed documents never match, as in the SQL backends.
                        serde_json::from_str::<Value>(&row.metadata).is_ok_and(|document| {
                            document.is_array() && json_contains(&document, &candidate)
                        })
                    })
                    .map(StoredRow::decode)
                    .collect::<Vec<_>>()
            })
            .flat_map(stream::iter),
        )
    }
}
