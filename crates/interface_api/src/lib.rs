//! HTTP API Layer
//!
//! This crate provides the REST API for the billing system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for invoices, contracts, and activity tracks
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Storage**: Source document persistence behind `DocumentStore`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod storage;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::DocumentStore;
use domain_billing::BillingPort;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{contracts, health, invoices, tracks};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub port: Arc<dyn BillingPort>,
    pub documents: Arc<dyn DocumentStore>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        port: Arc<dyn BillingPort>,
        documents: Arc<dyn DocumentStore>,
        config: ApiConfig,
    ) -> Self {
        Self {
            port,
            documents,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id", delete(invoices::delete_invoice))
        .route("/:id/total", get(invoices::get_invoice_total))
        .route("/:id/document", get(invoices::download_document));

    // Contract routes
    let contract_routes = Router::new()
        .route("/", post(contracts::create_contract))
        .route("/:id", get(contracts::get_contract));

    // Activity track routes
    let track_routes = Router::new().route("/", post(tracks::create_track));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .nest("/contracts", contract_routes)
        .nest("/activity-tracks", track_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
