//! Shared Module
//!
//! This module contains the types shared between the sync client and the
//! reference task server: the task record and its identity, the events the
//! sync service broadcasts, and application configuration.
//!
//! # Overview
//!
//! All types here are platform-agnostic and serialize to the JSON shapes
//! used on the wire (`/tasks` REST surface) and in local storage.

/// Task record, identity and partial update types
pub mod task;

/// Sync service events
pub mod event;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use task::{ColumnId, Priority, Status, Task, TaskFields, TaskId, TaskPatch, TEMP_ID_PREFIX};
pub use event::SyncEvent;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, MissingOnServer};
