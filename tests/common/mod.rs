//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - An in-memory, scriptable task server
//! - A sync service harness around it
//! - Custom assertion macros

#[macro_use]
pub mod assertions;
pub mod mock_server;

// Re-export commonly used utilities
pub use mock_server::*;
