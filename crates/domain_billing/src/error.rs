//! Billing domain errors

use core_kernel::{ContractId, InvoiceId, ProjectId, MoneyError, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Contract reference did not resolve
    #[error("Contract not found: {0}")]
    ContractNotFound(ContractId),

    /// Project reference did not resolve
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Invoice reference did not resolve
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Entry generation was attempted on an invoice that already has entries
    #[error("Entries already generated for invoice {0}")]
    EntriesAlreadyGenerated(InvoiceId),

    /// An activity track was claimed by a concurrent invoice generation
    ///
    /// Retryable: the caller must not assume any entries were created.
    #[error("Double-billing conflict: {0}")]
    DoubleBilling(String),

    /// Monetary validation failed (discount range, currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Period or date-range validation failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Validation failure outside money/temporal concerns
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying port failure
    #[error("Port error: {0}")]
    Port(PortError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// Returns true if retrying the operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            BillingError::DoubleBilling(_) => true,
            BillingError::Port(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<PortError> for BillingError {
    fn from(error: PortError) -> Self {
        // Conflicts out of the storage layer are the double-billing race
        match error {
            PortError::Conflict { message } => BillingError::DoubleBilling(message),
            other => BillingError::Port(other),
        }
    }
}
