//! Schema manager.
//!
//! Applies a backend's migration list in declared order. Each statement is
//! conditional on non-existence, so re-running the list against an
//! initialized store is a no-op. The first failing statement aborts the run.

use std::future::Future;

use tracing::{debug, error, info};

use crate::error::{EventLogError, Result};

/// Run `migrations` in order through `execute`.
pub(crate) async fn apply<F, Fut>(
    backend: &str,
    migrations: &'static [&'static str],
    mut execute: F,
) -> Result<()>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = std::result::Result<(), sqlx::Error>>,
{
    for (index, statement) in migrations.iter().enumerate() {
        debug!(backend, index, "Applying schema statement");
        if let Err(source) = execute(statement).await {
            error!(backend, index, error = %source, "Schema statement failed");
            return Err(EventLogError::Schema { index, source });
        }
    }

    info!(backend, statements = migrations.len(), "Event log schema ready");
    Ok(())
}
