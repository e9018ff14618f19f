//! Unified SQL storage implementations.
//!
//! This module provides the shared event log implementation for SQL-based
//! storage backends (PostgreSQL, SQLite, MySQL). The implementation is
//! parameterized by database type using the `SqlDatabase` trait.

mod event_log;
mod migrations;
mod query;

pub use event_log::SqlEventLog;
pub use query::SqlDatabase;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.
    //!
    //! Metadata is JSONB. Containment uses `@>`, which for arrays matches when
    //! every element of the right-hand array is contained in some element of
    //! the left, so the pair document is wrapped in a one-element array.

    use sea_query::{Expr, PostgresQueryBuilder, SimpleExpr};
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::PgPool;

    use crate::storage::schema::POSTGRES_MIGRATIONS;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        const NAME: &'static str = "postgres";
        const MIGRATIONS: &'static [&'static str] = POSTGRES_MIGRATIONS;

        fn build_select(stmt: sea_query::SelectStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(PostgresQueryBuilder)
        }

        fn metadata_column() -> SimpleExpr {
            Expr::cust("metadata::text")
        }

        fn metadata_value(document: String) -> SimpleExpr {
            Expr::cust_with_values("CAST(? AS jsonb)", [document])
        }

        fn metadata_contains(pair: String) -> SimpleExpr {
            Expr::cust_with_values("metadata @> jsonb_build_array(CAST(? AS jsonb))", [pair])
        }
    }

    /// PostgreSQL event log.
    pub type PostgresEventLog = super::SqlEventLog<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.
    //!
    //! Metadata is TEXT. Containment walks the array with `json_each` and
    //! compares each record's key and value to those of the pair document.

    use sea_query::{Expr, SimpleExpr, SqliteQueryBuilder};
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::SqlitePool;

    use crate::storage::schema::{EventsLog, SQLITE_MIGRATIONS};

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        const NAME: &'static str = "sqlite";
        const MIGRATIONS: &'static [&'static str] = SQLITE_MIGRATIONS;

        fn build_select(stmt: sea_query::SelectStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(SqliteQueryBuilder)
        }

        fn metadata_column() -> SimpleExpr {
            Expr::col(EventsLog::Metadata).into()
        }

        fn metadata_value(document: String) -> SimpleExpr {
            document.into()
        }

        fn metadata_contains(pair: String) -> SimpleExpr {
            // json_each fails on malformed documents; such rows cannot match.
            Expr::cust_with_values(
                "CASE WHEN json_valid(metadata) THEN EXISTS (\
                 SELECT 1 FROM json_each(metadata) AS kv \
                 WHERE kv.type = 'object' \
                 AND json_extract(kv.value, '$.key') = json_extract(?, '$.key') \
                 AND json_extract(kv.value, '$.value') = json_extract(?, '$.value')\
                 ) ELSE 0 END",
                [pair.clone(), pair],
            )
        }
    }

    /// SQLite event log.
    pub type SqliteEventLog = super::SqlEventLog<Sqlite>;
}

#[cfg(feature = "mysql")]
pub mod mysql {
    //! MySQL database backend.
    //!
    //! Metadata is a native JSON column; `JSON_CONTAINS` matches a candidate
    //! object against any element of the stored array.

    use sea_query::{Expr, MysqlQueryBuilder, SimpleExpr};
    use sea_query_binder::{SqlxBinder, SqlxValues};
    use sqlx::MySqlPool;

    use crate::storage::schema::MYSQL_MIGRATIONS;

    /// MySQL database marker type.
    pub struct Mysql;

    impl super::SqlDatabase for Mysql {
        type Pool = MySqlPool;

        const NAME: &'static str = "mysql";
        const MIGRATIONS: &'static [&'static str] = MYSQL_MIGRATIONS;

        fn build_select(stmt: sea_query::SelectStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(MysqlQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> (String, SqlxValues) {
            stmt.build_sqlx(MysqlQueryBuilder)
        }

        fn metadata_column() -> SimpleExpr {
            Expr::cust("CAST(metadata AS CHAR)")
        }

        fn metadata_value(document: String) -> SimpleExpr {
            Expr::cust_with_values("CAST(? AS JSON)", [document])
        }

        fn metadata_contains(pair: String) -> SimpleExpr {
            Expr::cust_with_values("JSON_CONTAINS(metadata, ?)", [pair])
        }
    }

    /// MySQL event log.
    pub type MysqlEventLog = super::SqlEventLog<Mysql>;
}
