//! Contract management
//!
//! A contract fixes the billing rates between a user and a project over a
//! date range. Contracts are never hard-deleted; an expired contract stays
//! on record because issued invoices reference the rates it carried.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    ActiveRange, BillingPeriod, ContractId, Currency, Money, ProjectId, TemporalError, UserId,
};

/// An agreement between a user and a project with negotiated rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier
    pub id: ContractId,
    /// The contracted user
    pub user_id: UserId,
    /// The project being worked on
    pub project_id: ProjectId,
    /// Role label, e.g. "Owner", "Developer"
    pub activity: String,
    /// Date range over which the contract is in force
    pub active_range: ActiveRange,
    /// What the user is paid per billed unit
    pub user_rate: Money,
    /// What the project is billed per unit; frozen onto invoice entries
    pub project_rate: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Creates a new contract
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::InvalidPeriod` if `ends_at` precedes
    /// `active_from`.
    pub fn new(
        user_id: UserId,
        project_id: ProjectId,
        activity: impl Into<String>,
        active_from: NaiveDate,
        ends_at: Option<NaiveDate>,
        user_rate: Money,
        project_rate: Money,
    ) -> Result<Self, TemporalError> {
        let now = Utc::now();
        Ok(Self {
            id: ContractId::new_v7(),
            user_id,
            project_id,
            activity: activity.into(),
            active_range: ActiveRange::new(active_from, ends_at)?,
            user_rate,
            project_rate,
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates the auto-provisioned "Owner" contract for a freshly created
    /// project: zero rates, active from today through one year out
    pub fn owner(user_id: UserId, project_id: ProjectId, currency: Currency) -> Self {
        let today = Utc::now().date_naive();
        let next_year = today
            .with_year(today.year() + 1)
            // Feb 29 + 1 year lands on Feb 28
            .unwrap_or_else(|| today.with_day(28).unwrap().with_year(today.year() + 1).unwrap());
        let now = Utc::now();

        Self {
            id: ContractId::new_v7(),
            user_id,
            project_id,
            activity: "Owner".to_string(),
            active_range: ActiveRange {
                active_from: today,
                ends_at: Some(next_year),
            },
            user_rate: Money::zero(currency),
            project_rate: Money::zero(currency),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the contract is in force on the given date
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active_range.is_active_on(date)
    }

    /// Returns true if the contract is in force today
    pub fn is_currently_active(&self) -> bool {
        self.is_active_on(Utc::now().date_naive())
    }

    /// Returns true if the contract's active range intersects the period
    ///
    /// A contract outside the invoice period contributes no entries; this
    /// is a normal outcome, not an error.
    pub fn covers(&self, period: &BillingPeriod) -> bool {
        self.active_range.intersects(period)
    }
}
