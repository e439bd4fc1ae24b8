//! Invoice handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillingPeriod, DocumentMetadata, InvoiceId, Timezone, UserId};
use domain_billing::invoice::parse_discount;
use domain_billing::{InvoiceAggregator, NewInvoice};

use crate::dto::invoices::*;
use crate::{error::ApiError, AppState};

/// Creates an invoice for a billing period
///
/// Stores the uploaded source document, then generates the invoice and
/// its entries atomically. A conflicting concurrent generation returns
/// 409 and leaves nothing behind.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;

    let discount_percentage = parse_discount(request.discount_percentage)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let timezone = match &request.timezone {
        Some(name) => name
            .parse::<chrono_tz::Tz>()
            .map(Timezone::new)
            .map_err(|_| ApiError::Validation(format!("Unknown timezone: {}", name)))?,
        None => Timezone::default(),
    };
    let period = BillingPeriod::from_dates(request.period_from, request.period_to, &timezone)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let document = state
        .documents
        .store(
            request.document.data,
            DocumentMetadata {
                filename: request.document.filename,
                content_type: request.document.content_type,
            },
        )
        .await?;

    let aggregator = InvoiceAggregator::new(state.port.clone());
    let invoice = aggregator
        .create_invoice(NewInvoice {
            project_id: request.project_id.into(),
            user_id: UserId::from(request.user_id),
            period,
            discount_percentage,
            currency: request.currency,
            document,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}

/// Gets an invoice with its entries
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let aggregator = InvoiceAggregator::new(state.port.clone());
    let invoice = aggregator.get_invoice(InvoiceId::from(id)).await?;
    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Gets just the computed totals of an invoice
pub async fn get_invoice_total(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceTotalResponse>, ApiError> {
    let aggregator = InvoiceAggregator::new(state.port.clone());
    let invoice = aggregator.get_invoice(InvoiceId::from(id)).await?;
    Ok(Json(InvoiceTotalResponse::from(&invoice)))
}

/// Soft-deletes an invoice
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let aggregator = InvoiceAggregator::new(state.port.clone());
    aggregator.delete_invoice(InvoiceId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Downloads the invoice's source document
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let aggregator = InvoiceAggregator::new(state.port.clone());
    let invoice = aggregator.get_invoice(InvoiceId::from(id)).await?;

    let bytes = state.documents.fetch(&invoice.document).await?;

    let headers = [
        (header::CONTENT_TYPE, invoice.document.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", invoice.document.filename),
        ),
    ];
    Ok((headers, bytes).into_response())
}
