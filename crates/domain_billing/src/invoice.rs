//! Invoice management
//!
//! Invoices snapshot billable activity over a period. Each entry carries
//! the rate the contract held when the invoice was generated; later rate
//! changes on the contract never touch an issued invoice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ActivityTrackId, BillingPeriod, ContractId, Currency, DiscountPercentage, DocumentHandle,
    InvoiceEntryId, InvoiceId, Money, ProjectId, UserId,
};

use crate::activity::ActivityTrack;
use crate::contract::Contract;
use crate::error::BillingError;

/// How a frozen rate converts an activity track into an entry total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Each track is billed at the contract rate once, regardless of length
    #[default]
    FlatPerEntry,
    /// The contract rate is an hourly rate applied to the track duration
    PerHour,
}

/// A single billable line on an invoice
///
/// The entry keeps a reference to the activity track it came from; the
/// storage layer holds a uniqueness constraint over that reference so a
/// track can never appear on two invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceEntry {
    /// Unique identifier
    pub id: InvoiceEntryId,
    /// Owning invoice
    pub invoice_id: InvoiceId,
    /// The activity track this entry bills
    pub activity_track_id: ActivityTrackId,
    /// Contract the rate was taken from
    pub contract_id: ContractId,
    /// Rate frozen from the contract at generation time
    pub rate: Money,
    /// Billed quantity (1 for flat entries, hours for hourly entries)
    pub quantity: Decimal,
    /// Line description, usually the track's note
    pub description: Option<String>,
    /// Start of the billed span
    pub from: DateTime<Utc>,
    /// End of the billed span
    pub to: DateTime<Utc>,
}

impl InvoiceEntry {
    /// Builds an entry for a track, freezing the contract's project rate
    pub fn from_track(
        invoice_id: InvoiceId,
        track: &ActivityTrack,
        contract: &Contract,
        policy: RatePolicy,
    ) -> Self {
        let quantity = match policy {
            RatePolicy::FlatPerEntry => Decimal::ONE,
            RatePolicy::PerHour => track.duration_hours(),
        };

        Self {
            id: InvoiceEntryId::new_v7(),
            invoice_id,
            activity_track_id: track.id,
            contract_id: contract.id,
            rate: contract.project_rate,
            quantity,
            description: track.description.clone(),
            from: track.from,
            to: track.to,
        }
    }

    /// Line total: rate multiplied by quantity
    pub fn total(&self) -> Money {
        self.rate * self.quantity
    }
}

/// Request payload for generating a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Project being invoiced
    pub project_id: ProjectId,
    /// User issuing the invoice
    pub user_id: UserId,
    /// Period the invoice covers
    pub period: BillingPeriod,
    /// Percentage discount off the subtotal
    pub discount_percentage: DiscountPercentage,
    /// Invoice currency
    pub currency: Currency,
    /// Source document backing the invoice
    pub document: DocumentHandle,
}

/// An invoice over a billing period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Project being invoiced
    pub project_id: ProjectId,
    /// User who issued the invoice
    pub user_id: UserId,
    /// Period the invoice covers
    pub period: BillingPeriod,
    /// Percentage discount off the subtotal
    pub discount_percentage: DiscountPercentage,
    /// Invoice currency
    pub currency: Currency,
    /// Generated line entries, ascending by start of span
    pub entries: Vec<InvoiceEntry>,
    /// Source document backing the invoice
    pub document: DocumentHandle,
    /// Proof of payment, attached once the invoice is settled
    pub payment_document: Option<DocumentHandle>,
    /// Whether the issuing user can see the invoice
    pub visible_for_user: bool,
    /// Whether the client can see the invoice
    pub visible_for_client: bool,
    /// Soft-deletion marker; deleted invoices stay on record
    pub deleted_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates an invoice shell with no entries yet
    pub fn new(new_invoice: NewInvoice) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            project_id: new_invoice.project_id,
            user_id: new_invoice.user_id,
            period: new_invoice.period,
            discount_percentage: new_invoice.discount_percentage,
            currency: new_invoice.currency,
            entries: Vec::new(),
            document: new_invoice.document,
            payment_document: None,
            visible_for_user: true,
            visible_for_client: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all entry totals, before discount
    pub fn subtotal(&self) -> Money {
        self.entries
            .iter()
            .fold(Money::zero(self.currency), |acc, entry| acc + entry.total())
    }

    /// Subtotal with the discount applied: subtotal * (100 - d) / 100
    ///
    /// Exact decimal arithmetic throughout; rounding happens only at the
    /// presentation edge.
    pub fn total(&self) -> Money {
        self.discount_percentage.apply_to(self.subtotal())
    }

    /// Records the proof-of-payment document
    pub fn attach_payment_document(&mut self, handle: DocumentHandle) {
        self.payment_document = Some(handle);
        self.updated_at = Utc::now();
    }

    /// Returns true if the invoice has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Marks the invoice deleted without destroying the record
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Returns true if the invoice should appear in the client's listing
    ///
    /// An invoice hidden from its own issuer is hidden from the client
    /// too; both visibility flags must be set.
    pub fn for_client(&self) -> bool {
        self.visible_for_user && self.visible_for_client && !self.is_deleted()
    }

    /// Attaches generated entries, keeping them ordered by span start
    ///
    /// # Errors
    ///
    /// Returns `EntriesAlreadyGenerated` if the invoice already carries
    /// entries. Generation is one-shot; regeneration would re-bill.
    pub fn with_entries(mut self, mut entries: Vec<InvoiceEntry>) -> Result<Self, BillingError> {
        if !self.entries.is_empty() {
            return Err(BillingError::EntriesAlreadyGenerated(self.id));
        }
        for entry in &entries {
            if entry.rate.currency() != self.currency {
                return Err(BillingError::validation(format!(
                    "Entry rate currency {} does not match invoice currency {}",
                    entry.rate.currency(),
                    self.currency
                )));
            }
        }
        entries.sort_by(|a, b| a.from.cmp(&b.from).then(a.activity_track_id.cmp(&b.activity_track_id)));
        self.entries = entries;
        Ok(self)
    }
}

/// Parses and validates a raw discount value
///
/// Values outside [0, 100] are rejected outright, never clamped; a typo'd
/// discount of 150 must fail loudly instead of silently billing zero.
pub fn parse_discount(raw: Decimal) -> Result<DiscountPercentage, BillingError> {
    if raw < Decimal::ZERO || raw > dec!(100) {
        return Err(BillingError::validation(format!(
            "Discount percentage must be between 0 and 100, got {}",
            raw
        )));
    }
    Ok(DiscountPercentage::new(raw)?)
}
