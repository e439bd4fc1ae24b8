//! Contract handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ContractId, Money};
use domain_billing::Contract;

use crate::dto::contracts::*;
use crate::{error::ApiError, AppState};

/// Creates a contract between a user and a project
pub async fn create_contract(
    State(state): State<AppState>,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractResponse>), ApiError> {
    request.validate()?;

    let contract = Contract::new(
        request.user_id.into(),
        request.project_id.into(),
        request.activity,
        request.active_from,
        request.ends_at,
        Money::new(request.user_rate, request.currency),
        Money::new(request.project_rate, request.currency),
    )
    .map_err(|e| ApiError::Validation(e.to_string()))?;

    state.port.insert_contract(&contract).await?;

    Ok((StatusCode::CREATED, Json(ContractResponse::from(&contract))))
}

/// Gets a contract by ID
pub async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract = state
        .port
        .get_contract(ContractId::from(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Contract not found: {}", id)))?;

    Ok(Json(ContractResponse::from(&contract)))
}
