//! Billing period resolution
//!
//! Given a contract and a period, the resolver answers: which activity
//! tracks does this invoice get to bill? A track qualifies when it pairs
//! the contract's user and project, lies entirely inside the period, and
//! has not been claimed by an earlier invoice.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use core_kernel::{ActivityTrackId, BillingPeriod, ContractId};

use crate::activity::ActivityTrack;
use crate::contract::Contract;
use crate::error::BillingError;
use crate::ports::BillingPort;

/// Filters tracks down to the ones a contract may bill for a period
///
/// The result is ordered ascending by span start, with the track id as a
/// deterministic tie-break for tracks starting at the same instant.
pub fn qualifying_tracks<'a>(
    contract: &Contract,
    period: &BillingPeriod,
    tracks: &'a [ActivityTrack],
    invoiced: &HashSet<ActivityTrackId>,
) -> Vec<&'a ActivityTrack> {
    if !contract.covers(period) {
        return Vec::new();
    }

    let mut qualifying: Vec<&ActivityTrack> = tracks
        .iter()
        .filter(|track| {
            track.user_id == contract.user_id
                && track.project_id == contract.project_id
                && track.is_within(period)
                && !invoiced.contains(&track.id)
        })
        .collect();
    qualifying.sort_by(|a, b| a.from.cmp(&b.from).then(a.id.cmp(&b.id)));
    qualifying
}

/// Port-backed resolver for billable activity
#[derive(Clone)]
pub struct BillingPeriodResolver {
    port: Arc<dyn BillingPort>,
}

impl BillingPeriodResolver {
    pub fn new(port: Arc<dyn BillingPort>) -> Self {
        Self { port }
    }

    /// Resolves the tracks a contract may bill for a period
    ///
    /// Returns an empty list when the contract does not cover the period.
    ///
    /// # Errors
    ///
    /// Returns `ContractNotFound` if the contract id does not resolve.
    pub async fn resolve(
        &self,
        contract_id: ContractId,
        period: &BillingPeriod,
    ) -> Result<Vec<ActivityTrack>, BillingError> {
        let contract = self
            .port
            .get_contract(contract_id)
            .await?
            .ok_or(BillingError::ContractNotFound(contract_id))?;

        if !contract.covers(period) {
            debug!(
                contract_id = %contract_id,
                period = %period,
                "Contract does not cover billing period, nothing to bill"
            );
            return Ok(Vec::new());
        }

        let tracks = self
            .port
            .tracks_for_pairing(contract.user_id, contract.project_id)
            .await?;
        let invoiced = self.port.invoiced_track_ids(contract.project_id).await?;

        let resolved: Vec<ActivityTrack> = qualifying_tracks(&contract, period, &tracks, &invoiced)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            contract_id = %contract_id,
            candidates = tracks.len(),
            resolved = resolved.len(),
            "Resolved billable activity tracks"
        );

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use core_kernel::{Currency, Money, ProjectId, UserId};
    use rust_decimal_macros::dec;

    fn contract() -> Contract {
        Contract::new(
            UserId::new(),
            ProjectId::new(),
            "Developer",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
            Money::new(dec!(60), Currency::EUR),
            Money::new(dec!(100), Currency::EUR),
        )
        .unwrap()
    }

    fn march() -> BillingPeriod {
        BillingPeriod::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    fn track_for(
        contract: &Contract,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ActivityTrack {
        ActivityTrack::new(contract.user_id, contract.project_id, from, to, None).unwrap()
    }

    #[test]
    fn test_qualifying_tracks_sorted_ascending() {
        let contract = contract();
        let period = march();
        let late = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 20, 17, 0, 0).unwrap(),
        );
        let early = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
        );
        let tracks = vec![late.clone(), early.clone()];

        let resolved = qualifying_tracks(&contract, &period, &tracks, &HashSet::new());

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, early.id);
        assert_eq!(resolved[1].id, late.id);
    }

    #[test]
    fn test_partially_overlapping_tracks_excluded() {
        let contract = contract();
        let period = march();
        let straddling = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 2, 29, 22, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap(),
        );
        let inside = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap(),
        );
        let tracks = vec![straddling, inside.clone()];

        let resolved = qualifying_tracks(&contract, &period, &tracks, &HashSet::new());

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, inside.id);
    }

    #[test]
    fn test_invoiced_tracks_excluded() {
        let contract = contract();
        let period = march();
        let billed = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
        );
        let fresh = track_for(
            &contract,
            Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 12, 17, 0, 0).unwrap(),
        );
        let tracks = vec![billed.clone(), fresh.clone()];
        let invoiced: HashSet<_> = [billed.id].into_iter().collect();

        let resolved = qualifying_tracks(&contract, &period, &tracks, &invoiced);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, fresh.id);
    }

    #[test]
    fn test_other_pairings_excluded() {
        let contract = contract();
        let period = march();
        let other_user = ActivityTrack::new(
            UserId::new(),
            contract.project_id,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
            None,
        )
        .unwrap();
        let other_project = ActivityTrack::new(
            contract.user_id,
            ProjectId::new(),
            Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 6, 17, 0, 0).unwrap(),
            None,
        )
        .unwrap();
        let tracks = vec![other_user, other_project];

        let resolved = qualifying_tracks(&contract, &period, &tracks, &HashSet::new());

        assert!(resolved.is_empty());
    }

    #[test]
    fn test_inactive_contract_yields_nothing() {
        let contract = contract();
        let after_expiry = BillingPeriod::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap(),
        )
        .unwrap();
        let track = track_for(
            &contract,
            Utc.with_ymd_and_hms(2025, 6, 5, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 5, 17, 0, 0).unwrap(),
        );
        let tracks = vec![track];

        let resolved = qualifying_tracks(&contract, &after_expiry, &tracks, &HashSet::new());

        assert!(resolved.is_empty());
    }
}
