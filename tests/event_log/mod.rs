//! Shared event log integration tests.
//!
//! Tests the EventLog interface against all implementations.
//! Each implementation module imports these test functions and runs them.

pub mod event_log_tests;
