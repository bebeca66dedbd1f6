//! Integration tests
//!
//! Record operations, reconciliation passes and the background service,
//! all against the in-memory task server.

pub mod reconciliation_test;
pub mod service_test;
pub mod synchronizer_test;
