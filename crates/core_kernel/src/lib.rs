//! Core Kernel - Foundational types and utilities for the billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for billing periods and contract validity ranges
//! - Strongly-typed identifiers
//! - Port abstractions and the document storage capability

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod documents;
pub mod ports;

pub use money::{Money, Currency, DiscountPercentage, MoneyError};
pub use temporal::{BillingPeriod, ActiveRange, Timezone, TemporalError};
pub use identifiers::{
    UserId, ProjectId, ContractId, ActivityTrackId,
    InvoiceId, InvoiceEntryId, DocumentId,
};
pub use documents::{DocumentHandle, DocumentMetadata, DocumentStore};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
