//! EventLog interface tests.
//!
//! These tests verify the contract of the EventLog trait.
//! Each storage implementation should run these tests. The store is shared
//! across tests within a run, so every test uses its own codes.

use chrono::{SubsecRound, Utc};
use futures::StreamExt;

use eventlog::storage::EventLog;
use eventlog::{Event, EventLogError, KeyValue, Metadata, NewEvent};

pub const MEETUP_BEGIN: &str = "golangdorset.meetup.begin";
pub const MEETUP_END: &str = "golangdorset.meetup.end";

/// The metadata the Golang Dorset meetup events carry.
pub fn meetup_metadata() -> Metadata {
    Metadata::new()
        .with("location", "Bournemouth")
        .with("attendees", "10")
        .with("organiser", "Golang Dorset")
        .with("talks", "2")
}

/// Create a test event.
pub fn make_event(code: &str, metadata: Metadata) -> NewEvent {
    NewEvent::new(code, format!("Test event {}", code), metadata).expect("valid event")
}

/// Drain a metadata query, panicking on any error item.
pub async fn collect_ok<L: EventLog>(log: &L, pair: &KeyValue) -> Vec<Event> {
    log.find_by_metadata(pair)
        .map(|result| result.expect("stream item should decode"))
        .collect()
        .await
}

// =============================================================================
// EventLog::ensure_schema tests
// =============================================================================

pub async fn test_ensure_schema_idempotent<L: EventLog>(log: &L) {
    log.ensure_schema()
        .await
        .expect("first ensure_schema should succeed");
    log.ensure_schema()
        .await
        .expect("second ensure_schema should succeed");

    let code = "test.schema.idempotent";
    log.insert(&make_event(code, Metadata::new().with("k", "v")))
        .await
        .expect("insert after re-applied schema should succeed");
    log.find_by_code(code)
        .await
        .expect("find after re-applied schema should succeed");
}

// =============================================================================
// EventLog::insert / find_by_code tests
// =============================================================================

pub async fn test_insert_and_find_by_code<L: EventLog>(log: &L) {
    // Backends store at millisecond or microsecond precision.
    let start = Utc::now().trunc_subsecs(3);

    let event = NewEvent::new(
        MEETUP_BEGIN,
        "Golang Dorset Meetup has begun.",
        meetup_metadata(),
    )
    .unwrap();
    log.insert(&event).await.expect("insert should succeed");

    let found = log
        .find_by_code(MEETUP_BEGIN)
        .await
        .expect("find_by_code should succeed");

    assert_eq!(found.code, MEETUP_BEGIN);
    assert_eq!(found.description, "Golang Dorset Meetup has begun.");
    assert_eq!(found.metadata, meetup_metadata(), "metadata order preserved");
    assert!(
        found.created_at >= start,
        "created_at {} should not precede insert start {}",
        found.created_at,
        start
    );
}

pub async fn test_insert_empty_metadata<L: EventLog>(log: &L) {
    let code = "test.insert.empty_metadata";
    log.insert(&make_event(code, Metadata::new()))
        .await
        .expect("insert should succeed");

    let found = log.find_by_code(code).await.expect("find should succeed");
    assert!(found.metadata.is_empty());
}

pub async fn test_insert_preserves_duplicate_keys<L: EventLog>(log: &L) {
    let code = "test.insert.duplicate_keys";
    let metadata = Metadata::new()
        .with("speaker", "alice")
        .with("topic", "generics")
        .with("speaker", "bob");

    log.insert(&make_event(code, metadata.clone()))
        .await
        .expect("insert should succeed");

    let found = log.find_by_code(code).await.expect("find should succeed");
    assert_eq!(found.metadata, metadata);
}

pub async fn test_insert_special_characters<L: EventLog>(log: &L) {
    let code = "test.insert.special'chars";
    let metadata = Metadata::new()
        .with("quote", "it's \"quoted\"")
        .with("path", "C:\\temp\\events")
        .with("unicode", "caf\u{e9} \u{1f680}")
        .with("sql", "'); DROP TABLE events_log; --");

    log.insert(&make_event(code, metadata.clone()))
        .await
        .expect("insert should succeed");

    let found = log.find_by_code(code).await.expect("find should succeed");
    assert_eq!(found.metadata, metadata);

    let matched = collect_ok(log, &KeyValue::new("quote", "it's \"quoted\"")).await;
    assert!(matched.iter().any(|e| e.code == code));
}

pub async fn test_insert_rejects_empty_code<L: EventLog>(log: &L) {
    let event = NewEvent {
        code: String::new(),
        description: "no code".to_string(),
        metadata: Metadata::new(),
    };
    let result = log.insert(&event).await;
    assert!(matches!(result, Err(EventLogError::InvalidEvent(_))));
}

pub async fn test_find_by_code_not_found<L: EventLog>(log: &L) {
    let result = log.find_by_code("test.never.inserted").await;
    match result {
        Err(EventLogError::NotFound { code }) => assert_eq!(code, "test.never.inserted"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

pub async fn test_find_by_code_with_duplicates<L: EventLog>(log: &L) {
    let code = "test.find.duplicate_code";
    log.insert(&make_event(code, Metadata::new().with("n", "1")))
        .await
        .unwrap();
    log.insert(&make_event(code, Metadata::new().with("n", "2")))
        .await
        .unwrap();

    // Either row may come back; it must be one of them, fully decoded.
    let found = log.find_by_code(code).await.expect("find should succeed");
    assert_eq!(found.code, code);
    assert!(matches!(found.metadata.get("n"), Some("1") | Some("2")));
}

// =============================================================================
// EventLog::find_by_metadata tests
// =============================================================================

pub async fn test_find_by_metadata_matches_all<L: EventLog>(log: &L) {
    log.insert(&make_event(MEETUP_END, meetup_metadata()))
        .await
        .unwrap();
    log.insert(&make_event(
        "test.metadata.begin",
        Metadata::new()
            .with("talks", "3")
            .with("location", "Bournemouth"),
    ))
    .await
    .unwrap();
    log.insert(&make_event(
        "test.metadata.elsewhere",
        Metadata::new().with("location", "Poole"),
    ))
    .await
    .unwrap();

    let pair = KeyValue::new("location", "Bournemouth");
    let events = collect_ok(log, &pair).await;

    assert!(events.iter().any(|e| e.code == MEETUP_END));
    assert!(events.iter().any(|e| e.code == "test.metadata.begin"));
    assert!(!events.iter().any(|e| e.code == "test.metadata.elsewhere"));
    for event in &events {
        assert!(event.metadata.contains(&pair), "{} lacks the pair", event.code);
    }

    let end = events.iter().find(|e| e.code == MEETUP_END).unwrap();
    assert_eq!(end.metadata, meetup_metadata(), "fully decoded");
}

pub async fn test_find_by_metadata_no_match<L: EventLog>(log: &L) {
    let events: Vec<_> = log
        .find_by_metadata(&KeyValue::new("location", "Nowhere"))
        .collect()
        .await;
    assert!(events.is_empty(), "no match should be an empty stream");
}

pub async fn test_find_by_metadata_requires_key_and_value<L: EventLog>(log: &L) {
    let code = "test.metadata.exact";
    log.insert(&make_event(code, Metadata::new().with("room", "101")))
        .await
        .unwrap();

    assert!(collect_ok(log, &KeyValue::new("room", "101"))
        .await
        .iter()
        .any(|e| e.code == code));

    let wrong_value = collect_ok(log, &KeyValue::new("room", "102")).await;
    assert!(!wrong_value.iter().any(|e| e.code == code));

    let swapped = collect_ok(log, &KeyValue::new("101", "room")).await;
    assert!(!swapped.iter().any(|e| e.code == code));

    // Key and value must come from the same record.
    let code = "test.metadata.cross_record";
    log.insert(&make_event(
        code,
        Metadata::new().with("floor", "2").with("desk", "7"),
    ))
    .await
    .unwrap();
    let crossed = collect_ok(log, &KeyValue::new("floor", "7")).await;
    assert!(!crossed.iter().any(|e| e.code == code));
}

pub async fn test_find_by_metadata_early_drop<L: EventLog>(log: &L) {
    for i in 0..5 {
        log.insert(&make_event(
            &format!("test.metadata.drop.{}", i),
            Metadata::new().with("batch", "early-drop"),
        ))
        .await
        .unwrap();
    }

    {
        let mut stream = log.find_by_metadata(&KeyValue::new("batch", "early-drop"));
        let first = stream.next().await.expect("at least one row");
        assert!(first.is_ok());
    }

    // The abandoned stream must not hold up later work.
    let events = collect_ok(log, &KeyValue::new("batch", "early-drop")).await;
    assert_eq!(events.len(), 5);
}

/// The caller must have planted a row with code `corrupt_code` whose metadata
/// document contains `pair` but does not decode.
pub async fn test_find_by_metadata_isolates_decode_failure<L: EventLog>(
    log: &L,
    pair: &KeyValue,
    corrupt_code: &str,
) {
    log.insert(&make_event(
        "test.isolation.before",
        Metadata::new().with(pair.key.clone(), pair.value.clone()),
    ))
    .await
    .unwrap();
    log.insert(&make_event(
        "test.isolation.after",
        Metadata::new()
            .with("extra", "1")
            .with(pair.key.clone(), pair.value.clone()),
    ))
    .await
    .unwrap();

    let results: Vec<_> = log.find_by_metadata(pair).collect().await;
    assert_eq!(results.len(), 3, "every matching row is reported");

    let mut decoded = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(event) => decoded.push(event.code),
            Err(EventLogError::Decode { code, .. }) => failures.push(code),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(failures, vec![corrupt_code.to_string()]);
    decoded.sort();
    assert_eq!(decoded, vec!["test.isolation.after", "test.isolation.before"]);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all EventLog interface tests against a log implementation.
#[macro_export]
macro_rules! run_event_log_tests {
    ($log:expr) => {
        use $crate::event_log::event_log_tests::*;

        test_ensure_schema_idempotent($log).await;
        println!("  test_ensure_schema_idempotent: PASSED");

        // insert / find_by_code tests
        test_insert_and_find_by_code($log).await;
        println!("  test_insert_and_find_by_code: PASSED");

        test_insert_empty_metadata($log).await;
        println!("  test_insert_empty_metadata: PASSED");

        test_insert_preserves_duplicate_keys($log).await;
        println!("  test_insert_preserves_duplicate_keys: PASSED");

        test_insert_special_characters($log).await;
        println!("  test_insert_special_characters: PASSED");

        test_insert_rejects_empty_code($log).await;
        println!("  test_insert_rejects_empty_code: PASSED");

        test_find_by_code_not_found($log).await;
        println!("  test_find_by_code_not_found: PASSED");

        test_find_by_code_with_duplicates($log).await;
        println!("  test_find_by_code_with_duplicates: PASSED");

        // find_by_metadata tests
        test_find_by_metadata_matches_all($log).await;
        println!("  test_find_by_metadata_matches_all: PASSED");

        test_find_by_metadata_no_match($log).await;
        println!("  test_find_by_metadata_no_match: PASSED");

        test_find_by_metadata_requires_key_and_value($log).await;
        println!("  test_find_by_metadata_requires_key_and_value: PASSED");

        test_find_by_metadata_early_drop($log).await;
        println!("  test_find_by_metadata_early_drop: PASSED");
    };
}
