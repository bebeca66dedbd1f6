//! Test suite for taskboard-sync
//!
//! This module organizes all tests

#[macro_use]
pub mod common;
#[cfg(feature = "ssr")]
pub mod e2e;
pub mod integration;
