//! Mock storage implementations for testing.

mod event_log;

pub use event_log::MockEventLog;
