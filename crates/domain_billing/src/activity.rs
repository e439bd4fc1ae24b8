//! Activity tracking
//!
//! Activity tracks are the raw material of invoicing: immutable records
//! of a user working on a project over a half-open slice of time. Once a
//! track is referenced by an invoice entry it can never be billed again.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ActivityTrackId, BillingPeriod, ProjectId, UserId};

use crate::error::BillingError;

/// A logged span of work by a user on a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTrack {
    /// Unique identifier
    pub id: ActivityTrackId,
    /// Who did the work
    pub user_id: UserId,
    /// Which project the work was for
    pub project_id: ProjectId,
    /// Start of the tracked span
    pub from: DateTime<Utc>,
    /// End of the tracked span, strictly after `from`
    pub to: DateTime<Utc>,
    /// Free-text note shown on the invoice line
    pub description: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl ActivityTrack {
    /// Creates a new activity track
    ///
    /// # Errors
    ///
    /// Returns a validation error if `to` is not strictly after `from`.
    /// Zero-duration tracks are rejected; there is nothing to bill.
    pub fn new(
        user_id: UserId,
        project_id: ProjectId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<Self, BillingError> {
        if to <= from {
            return Err(BillingError::validation(format!(
                "Activity track must end after it starts: {} >= {}",
                from, to
            )));
        }

        Ok(Self {
            id: ActivityTrackId::new_v7(),
            user_id,
            project_id,
            from,
            to,
            description,
            created_at: Utc::now(),
        })
    }

    /// Duration of the track in fractional hours
    pub fn duration_hours(&self) -> Decimal {
        let seconds = (self.to - self.from).num_seconds();
        Decimal::from(seconds) / Decimal::from(3600)
    }

    /// Returns true if the track lies entirely inside the period
    ///
    /// Partial overlap does not count: a track straddling the period
    /// boundary belongs to neither side and waits for a period that
    /// contains it whole.
    pub fn is_within(&self, period: &BillingPeriod) -> bool {
        period.contains_span(self.from, self.to)
    }
}
