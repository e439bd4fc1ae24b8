//! Invoice aggregation
//!
//! The aggregator turns resolved activity into a persisted invoice in a
//! single shot: resolve billable tracks, freeze rates into entries, then
//! hand the whole invoice to the port as one atomic write. A failure at
//! any point leaves no partial invoice behind.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::InvoiceId;

use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceEntry, NewInvoice, RatePolicy};
use crate::ports::BillingPort;
use crate::resolver::qualifying_tracks;

/// Generates invoices with entries frozen from contract rates
#[derive(Clone)]
pub struct InvoiceAggregator {
    port: Arc<dyn BillingPort>,
    policy: RatePolicy,
}

impl InvoiceAggregator {
    pub fn new(port: Arc<dyn BillingPort>) -> Self {
        Self {
            port,
            policy: RatePolicy::default(),
        }
    }

    pub fn with_policy(port: Arc<dyn BillingPort>, policy: RatePolicy) -> Self {
        Self { port, policy }
    }

    /// Creates an invoice and generates its entries atomically
    ///
    /// Every active contract on the project contributes entries for the
    /// tracks it may bill in the period. The invoice and all entries are
    /// persisted in one transaction; if the storage layer reports that a
    /// track was claimed concurrently, nothing is written and the caller
    /// gets a retryable `DoubleBilling` error.
    #[instrument(skip(self, new_invoice), fields(project_id = %new_invoice.project_id))]
    pub async fn create_invoice(&self, new_invoice: NewInvoice) -> Result<Invoice, BillingError> {
        let invoice = Invoice::new(new_invoice);

        let contracts = self.port.contracts_for_project(invoice.project_id).await?;
        let invoiced = self.port.invoiced_track_ids(invoice.project_id).await?;

        let mut entries: Vec<InvoiceEntry> = Vec::new();
        for contract in contracts.iter().filter(|c| c.covers(&invoice.period)) {
            let tracks = self
                .port
                .tracks_for_pairing(contract.user_id, contract.project_id)
                .await?;
            for track in qualifying_tracks(contract, &invoice.period, &tracks, &invoiced) {
                entries.push(InvoiceEntry::from_track(
                    invoice.id,
                    track,
                    contract,
                    self.policy,
                ));
            }
        }

        if entries.is_empty() {
            warn!(
                invoice_id = %invoice.id,
                period = %invoice.period,
                "Invoice generated with no billable activity"
            );
        }

        let invoice = invoice.with_entries(entries)?;
        self.port.insert_invoice(&invoice).await?;

        info!(
            invoice_id = %invoice.id,
            entries = invoice.entries.len(),
            subtotal = %invoice.subtotal().amount(),
            total = %invoice.total().amount(),
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Fetches an invoice by id
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if the id does not resolve; the port
    /// already excludes soft-deleted invoices.
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, BillingError> {
        self.port
            .get_invoice(id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(id))
    }

    /// Soft-deletes an invoice; its tracks stay claimed
    pub async fn delete_invoice(&self, id: InvoiceId) -> Result<(), BillingError> {
        self.get_invoice(id).await?;
        self.port.soft_delete_invoice(id).await?;
        info!(invoice_id = %id, "Invoice soft-deleted");
        Ok(())
    }
}
