//! Sync Client Module
//!
//! This module provides the local-first synchronization engine: a durable
//! local replica of the task board that keeps working while the task server
//! is unreachable and reconciles with it once it comes back.
//!
//! # Architecture
//!
//! The client module is organized into focused submodules:
//!
//! - **`config`** - Configuration loading (TOML file, environment overrides)
//! - **`error`** - Error taxonomy (`ServerError`, `StorageError`, `SyncError`)
//! - **`api`** - `TaskServer` trait and its reqwest implementation
//! - **`local_db`** - Local replica and pending-delete set over a key-value store
//! - **`offline`** - Record synchronizer, identity allocation, reconciliation
//! - **`sync`** - Background sync service, connectivity probe, state, metrics
//! - **`main`** - `taskboard-sync` entry point (binary)
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Sync daemon entry point
//! ├── config.rs       - Configuration management
//! ├── error.rs        - Error types
//! ├── api.rs          - Task server client
//! ├── local_db/       - Durable local replica
//! ├── offline/        - Offline-first operations and reconciliation
//! └── sync/           - Background service
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! // Run the sync daemon against a local task server:
//! // TASKBOARD_API_URL=http://localhost:3001 cargo run --bin taskboard-sync
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod local_db;
pub mod offline;
pub mod sync;

// Re-export commonly used types
pub use api::{HttpTaskServer, TaskServer};
pub use config::Config;
pub use error::{ServerError, StorageError, SyncError};
pub use local_db::{KeyValueStore, LocalReplica, MemoryStore, SqliteStore};
pub use offline::{Confirmation, ReconciliationResult, TaskSynchronizer};
pub use sync::{SyncService, SyncState};
