//! End-to-end tests against the reference task server
