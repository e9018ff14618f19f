//! SQL database abstraction trait.

use sea_query::{InsertStatement, SelectStatement, SimpleExpr};
use sea_query_binder::SqlxValues;

/// Trait for SQL database backends.
///
/// This trait abstracts over different SQL databases (PostgreSQL, SQLite,
/// MySQL) by providing the pool type, the migration list, query building and
/// the dialect-specific pieces of the metadata column: how it is read back as
/// text, how an encoded document is written, and how containment is tested.
pub trait SqlDatabase: Send + Sync + 'static {
    /// The connection pool type for this database.
    type Pool: Clone + Send + Sync;

    /// Backend name used in logs.
    const NAME: &'static str;

    /// Ordered, re-runnable schema statements.
    const MIGRATIONS: &'static [&'static str];

    /// Build a SQL query and its bound values from a sea-query SELECT statement.
    fn build_select(stmt: SelectStatement) -> (String, SqlxValues);

    /// Build a SQL query and its bound values from a sea-query INSERT statement.
    fn build_insert(stmt: InsertStatement) -> (String, SqlxValues);

    /// Expression selecting the metadata column as text.
    fn metadata_column() -> SimpleExpr;

    /// Expression storing an encoded metadata document.
    fn metadata_value(document: String) -> SimpleExpr;

    /// Predicate matching rows whose metadata array contains the encoded
    /// single-record document `pair`.
    fn metadata_contains(pair: String) -> SimpleExpr;
}
