//! Task Module
//!
//! The reference server's task table and the `/tasks` REST handlers.

/// In-memory task table
pub mod state;

/// HTTP handlers
pub mod handlers;

pub use state::TaskStore;
