//! Server Module
//!
//! Initialization and configuration of the reference task server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Listening address from the environment
//! └── init.rs         - App creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use taskboard_sync::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app().await;
//! let listener = tokio::net::TcpListener::bind(ServerConfig::from_env().addr()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::ServerConfig;
pub use init::{create_app, create_app_with_state};
pub use state::AppState;
