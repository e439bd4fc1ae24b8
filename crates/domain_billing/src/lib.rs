//! Billing Domain - Time-Tracking Invoice Generation
//!
//! This crate implements the billing core: contracts fix a rate between a
//! user and a project over a date range, logged activity tracks fall into
//! invoicing periods, and invoices freeze line items out of that activity.
//!
//! # Correctness rules
//!
//! - Entry rates are copied from the contract at generation time and are
//!   never recomputed afterwards; issued invoices do not silently change.
//! - An activity track belongs to at most one invoice, ever. The storage
//!   layer enforces this with a uniqueness constraint; the resolver's
//!   "not already invoiced" filter is only the fast path.
//! - Invoice persistence and entry generation share one atomic boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{InvoiceAggregator, NewInvoice};
//!
//! let aggregator = InvoiceAggregator::new(port);
//! let invoice = aggregator.create_invoice(new_invoice).await?;
//! assert_eq!(invoice.total().amount(), dec!(270));
//! ```

pub mod contract;
pub mod activity;
pub mod invoice;
pub mod resolver;
pub mod aggregator;
pub mod ports;
pub mod error;

pub use contract::Contract;
pub use activity::ActivityTrack;
pub use invoice::{Invoice, InvoiceEntry, NewInvoice, RatePolicy};
pub use resolver::{BillingPeriodResolver, qualifying_tracks};
pub use aggregator::InvoiceAggregator;
pub use ports::BillingPort;
pub use error::BillingError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockBillingPort;
