//! Backend Module
//!
//! A small reference implementation of the task server the sync client talks
//! to: an in-memory task table behind the `/tasks` REST surface. Used for
//! local development and end-to-end tests of the sync engine.
//!
//! Only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - State, configuration and app creation
//! - **`routes`** - Router assembly and middleware
//! - **`tasks`** - Task table and request handlers
//! - **`error`** - `ApiError` and its JSON response mapping

/// Server initialization and state
pub mod server;

/// Route configuration
pub mod routes;

/// Task table and handlers
pub mod tasks;

/// Error types
pub mod error;
