//! Repository implementations for domain entities
//!
//! Concrete repository implementations handling database access for the
//! billing aggregate. Repositories encapsulate SQL queries and map
//! between database rows and domain types.
//!
//! # Architecture
//!
//! - Runtime-bound SQLx queries, so the crate builds without a live
//!   database connection
//! - Transaction support for multi-row writes
//! - Constraint violations surfaced as typed errors

pub mod billing;

pub use billing::PostgresBillingRepository;
