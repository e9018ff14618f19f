//! Database schema definitions using sea-query.
//!
//! The `EventsLog` identifiers are used for type-safe query building. The
//! migration lists are applied in order by the schema manager; every statement
//! must be safe to re-run, and new statements are only ever appended.

use sea_query::Iden;

/// Events log table schema.
#[derive(Iden)]
pub enum EventsLog {
    Table,
    #[iden = "code"]
    Code,
    #[iden = "description"]
    Description,
    #[iden = "metadata"]
    Metadata,
    #[iden = "created_at"]
    CreatedAt,
}

/// SQLite migrations.
///
/// SQLite has no JSON column type; metadata is TEXT. `created_at` defaults to
/// an RFC 3339 UTC timestamp with millisecond precision, the finest `strftime`
/// offers.
pub const SQLITE_MIGRATIONS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS events_log (
    code TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_events_log_code ON events_log(code)",
];

/// PostgreSQL migrations.
///
/// JSONB cannot hold the `\u0000` escape, so metadata containing a NUL
/// character encodes but is refused by the store and surfaces as `Insert`.
pub const POSTGRES_MIGRATIONS: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS events_log (
    code TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata JSONB NOT NULL,
    created_at TIMESTAMPTZ(6) NOT NULL DEFAULT now()
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_events_log_code ON events_log(code)",
    // jsonb_path_ops supports exactly the @> operator used for containment.
    "CREATE INDEX IF NOT EXISTS idx_events_log_metadata ON events_log USING GIN (metadata jsonb_path_ops)",
];

/// MySQL migrations.
///
/// MySQL has no `CREATE INDEX IF NOT EXISTS`, so only the table is managed.
pub const MYSQL_MIGRATIONS: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS events_log (
    code TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata JSON NOT NULL,
    created_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
)
"#];
