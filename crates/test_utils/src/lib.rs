//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! billing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for domain types

pub mod fixtures;
pub mod builders;
pub mod assertions;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
