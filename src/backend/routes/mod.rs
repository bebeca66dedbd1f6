//! Route Configuration Module
//!
//! HTTP routes of the reference task server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports and documentation
//! ├── router.rs     - Router assembly and middleware
//! └── api_routes.rs - `/tasks` endpoints
//! ```

/// Main router creation
pub mod router;

/// Task API routes
pub mod api_routes;

pub use router::create_router;
