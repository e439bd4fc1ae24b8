//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_billing::{Invoice, InvoiceEntry};

/// Uploaded source document, carried inline in the request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentUpload {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    #[validate(length(min = 1, max = 127))]
    pub content_type: String,
    /// Raw document bytes
    pub data: Vec<u8>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub project_id: Uuid,
    pub user_id: Uuid,
    /// First day of the billed period (inclusive)
    pub period_from: NaiveDate,
    /// Last day of the billed period (inclusive)
    pub period_to: NaiveDate,
    /// IANA timezone name used to anchor the period days; defaults to UTC
    pub timezone: Option<String>,
    pub discount_percentage: Decimal,
    pub currency: Currency,
    #[validate(nested)]
    pub document: DocumentUpload,
}

#[derive(Debug, Serialize)]
pub struct InvoiceEntryResponse {
    pub id: String,
    pub activity_track_id: String,
    pub contract_id: String,
    pub rate: Decimal,
    pub quantity: Decimal,
    pub total: Decimal,
    pub description: Option<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<&InvoiceEntry> for InvoiceEntryResponse {
    fn from(entry: &InvoiceEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            activity_track_id: entry.activity_track_id.to_string(),
            contract_id: entry.contract_id.to_string(),
            rate: entry.rate.amount(),
            quantity: entry.quantity,
            total: entry.total().amount(),
            description: entry.description.clone(),
            from: entry.from,
            to: entry.to,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub discount_percentage: Decimal,
    pub currency: Currency,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub entries: Vec<InvoiceEntryResponse>,
    pub document_filename: String,
    pub payment_document_filename: Option<String>,
    pub visible_for_client: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            project_id: invoice.project_id.to_string(),
            user_id: invoice.user_id.to_string(),
            period_start: invoice.period.start,
            period_end: invoice.period.end,
            discount_percentage: invoice.discount_percentage.as_percentage(),
            currency: invoice.currency,
            subtotal: invoice.subtotal().amount(),
            total: invoice.total().amount(),
            entries: invoice.entries.iter().map(InvoiceEntryResponse::from).collect(),
            document_filename: invoice.document.filename.clone(),
            payment_document_filename: invoice
                .payment_document
                .as_ref()
                .map(|d| d.filename.clone()),
            visible_for_client: invoice.visible_for_client,
            created_at: invoice.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceTotalResponse {
    pub id: String,
    pub currency: Currency,
    pub subtotal: Decimal,
    pub discount_percentage: Decimal,
    pub total: Decimal,
}

impl From<&Invoice> for InvoiceTotalResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            currency: invoice.currency,
            subtotal: invoice.subtotal().amount(),
            discount_percentage: invoice.discount_percentage.as_percentage(),
            total: invoice.total().amount(),
        }
    }
}
