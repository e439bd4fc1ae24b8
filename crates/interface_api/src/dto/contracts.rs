//! Contract DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_billing::Contract;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContractRequest {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub activity: String,
    pub active_from: NaiveDate,
    pub ends_at: Option<NaiveDate>,
    pub user_rate: Decimal,
    pub project_rate: Decimal,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub activity: String,
    pub active_from: NaiveDate,
    pub ends_at: Option<NaiveDate>,
    pub user_rate: Decimal,
    pub project_rate: Decimal,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl From<&Contract> for ContractResponse {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id.to_string(),
            user_id: contract.user_id.to_string(),
            project_id: contract.project_id.to_string(),
            activity: contract.activity.clone(),
            active_from: contract.active_range.active_from,
            ends_at: contract.active_range.ends_at,
            user_rate: contract.user_rate.amount(),
            project_rate: contract.project_rate.amount(),
            currency: contract.project_rate.currency(),
            created_at: contract.created_at,
        }
    }
}
