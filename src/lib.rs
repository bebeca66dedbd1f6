//! Taskboard Sync - Main Library
//!
//! A local-first synchronization engine for a task board. Tasks can be
//! created, edited and deleted while the task server is unreachable; the
//! engine keeps a durable local replica and reconciles it with the server
//! without losing or duplicating records.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Task record, identity and partial update types
//!   - Sync events
//!   - Application configuration
//!
//! - **`client`** - The sync engine
//!   - Local replica over a key-value store
//!   - Offline-first record operations and temporary identities
//!   - Reconciliation (drain deletes, promote, push, pull and merge)
//!   - Background service with connectivity probing
//!
//! - **`backend`** - Reference task server (only compiled with `ssr` feature)
//!   - Axum in-memory implementation of the `/tasks` REST surface
//!
//! # Feature Flags
//!
//! - **`ssr`** - enables the `backend` module and the `taskboard-server`
//!   binary (on by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard_sync::client::{Config, HttpTaskServer, MemoryStore, SyncService};
//! use taskboard_sync::shared::TaskFields;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let server = Arc::new(HttpTaskServer::new(config.clone())?);
//! let mut service = SyncService::new(config, server, Arc::new(MemoryStore::new()));
//! service.start()?;
//!
//! // Works offline too: the task gets a temporary id until the next pass
//! let task = service.synchronizer().create(TaskFields::new("Triage bugs")).await?;
//! println!("created {}", task.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The local replica sits behind one `tokio::sync::Mutex`; every record
//!   operation and reconciliation pass holds it for its whole duration
//! - Sync events go out on a `broadcast` channel, connectivity on a `watch`
//! - Server state is `Arc<RwLock<TaskStore>>`

/// Shared types and data structures
pub mod shared;

/// Local-first sync engine
pub mod client;

/// Reference task server
#[cfg(feature = "ssr")]
pub mod backend;
