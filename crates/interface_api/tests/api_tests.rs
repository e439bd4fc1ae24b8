//! Handler-level tests for the billing API
//!
//! Handlers are exercised directly against the in-memory billing port
//! and document store, without a running HTTP server.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::Currency;
use domain_billing::{ActivityTrack, Contract, MockBillingPort};
use test_utils::{ActivityTrackBuilder, ContractBuilder};

use interface_api::config::ApiConfig;
use interface_api::dto::invoices::{CreateInvoiceRequest, DocumentUpload};
use interface_api::dto::tracks::CreateTrackRequest;
use interface_api::error::ApiError;
use interface_api::handlers::{invoices, tracks};
use interface_api::storage::InMemoryDocumentStore;
use interface_api::AppState;

fn test_contract() -> Contract {
    ContractBuilder::new().build()
}

fn march_tracks(contract: &Contract) -> Vec<ActivityTrack> {
    (0..3)
        .map(|i| {
            ActivityTrackBuilder::new()
                .for_contract(contract)
                .on_day(5 + i)
                .build()
        })
        .collect()
}

async fn state_with(contract: &Contract, tracks: Vec<ActivityTrack>) -> AppState {
    let port = Arc::new(MockBillingPort::with_data(vec![contract.clone()], tracks).await);
    AppState::new(
        port,
        Arc::new(InMemoryDocumentStore::new()),
        ApiConfig::default(),
    )
}

fn invoice_request(contract: &Contract, discount: rust_decimal::Decimal) -> CreateInvoiceRequest {
    CreateInvoiceRequest {
        project_id: contract.project_id.into(),
        user_id: contract.user_id.into(),
        period_from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        period_to: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        timezone: None,
        discount_percentage: discount,
        currency: Currency::EUR,
        document: DocumentUpload {
            filename: "invoice.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: b"pdf bytes".to_vec(),
        },
    }
}

#[tokio::test]
async fn test_create_invoice_returns_created_with_totals() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let (status, Json(response)) =
        invoices::create_invoice(State(state), Json(invoice_request(&contract, dec!(10))))
            .await
            .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response.entries.len(), 3);
    assert_eq!(response.subtotal, dec!(300));
    assert_eq!(response.total, dec!(270));
    assert_eq!(response.document_filename, "invoice.pdf");
}

#[tokio::test]
async fn test_out_of_range_discount_is_rejected() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let result =
        invoices::create_invoice(State(state), Json(invoice_request(&contract, dec!(150)))).await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_get_invoice_total() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let (_, Json(created)) = invoices::create_invoice(
        State(state.clone()),
        Json(invoice_request(&contract, dec!(33))),
    )
    .await
    .unwrap();

    let id: Uuid = created.id.parse::<core_kernel::InvoiceId>().unwrap().into();
    let Json(total) = invoices::get_invoice_total(State(state), Path(id))
        .await
        .unwrap();

    assert_eq!(total.subtotal, dec!(300));
    assert_eq!(total.total, dec!(201));
}

#[tokio::test]
async fn test_get_missing_invoice_is_not_found() {
    let contract = test_contract();
    let state = state_with(&contract, vec![]).await;

    let result = invoices::get_invoice(State(state), Path(Uuid::new_v4())).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let (_, Json(created)) = invoices::create_invoice(
        State(state.clone()),
        Json(invoice_request(&contract, dec!(0))),
    )
    .await
    .unwrap();
    let id: Uuid = created.id.parse::<core_kernel::InvoiceId>().unwrap().into();

    let status = invoices::delete_invoice(State(state.clone()), Path(id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let result = invoices::get_invoice(State(state), Path(id)).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_create_track_then_invoice_bills_it() {
    let contract = test_contract();
    let state = state_with(&contract, vec![]).await;

    let (status, Json(track)) = tracks::create_track(
        State(state.clone()),
        Json(CreateTrackRequest {
            user_id: contract.user_id.into(),
            project_id: contract.project_id.into(),
            from: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
            description: Some("API work".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let (_, Json(invoice)) = invoices::create_invoice(
        State(state),
        Json(invoice_request(&contract, dec!(0))),
    )
    .await
    .unwrap();

    assert_eq!(invoice.entries.len(), 1);
    assert_eq!(invoice.entries[0].activity_track_id, track.id);
    assert_eq!(invoice.total, dec!(100));
}

#[tokio::test]
async fn test_inverted_track_span_is_rejected() {
    let contract = test_contract();
    let state = state_with(&contract, vec![]).await;

    let result = tracks::create_track(
        State(state),
        Json(CreateTrackRequest {
            user_id: contract.user_id.into(),
            project_id: contract.project_id.into(),
            from: Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            description: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_document_survives_upload() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let (_, Json(created)) = invoices::create_invoice(
        State(state.clone()),
        Json(invoice_request(&contract, dec!(0))),
    )
    .await
    .unwrap();
    let id: Uuid = created.id.parse::<core_kernel::InvoiceId>().unwrap().into();

    let response = invoices::download_document(State(state), Path(id))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&body[..], b"pdf bytes");
}

// The mock port honors the same uniqueness guarantee as the database,
// so the second invoice over the same period bills nothing.
#[tokio::test]
async fn test_second_invoice_over_same_period_is_empty() {
    let contract = test_contract();
    let state = state_with(&contract, march_tracks(&contract)).await;

    let (_, Json(first)) = invoices::create_invoice(
        State(state.clone()),
        Json(invoice_request(&contract, dec!(0))),
    )
    .await
    .unwrap();
    assert_eq!(first.entries.len(), 3);

    let (_, Json(second)) = invoices::create_invoice(
        State(state),
        Json(invoice_request(&contract, dec!(0))),
    )
    .await
    .unwrap();
    assert!(second.entries.is_empty());
    assert_eq!(second.total, dec!(0));
}
