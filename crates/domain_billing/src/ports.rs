//! Ports for billing storage
//!
//! The billing domain talks to storage through `BillingPort`, allowing
//! swappable implementations (PostgreSQL adapter, in-memory mock).
//!
//! `insert_invoice` is the atomic boundary: the invoice row and all of
//! its entries are written in one transaction, and the implementation
//! must enforce that an activity track appears on at most one invoice,
//! reporting a violation as `PortError::Conflict`.

use std::collections::HashSet;

use async_trait::async_trait;

use core_kernel::{
    ActivityTrackId, ContractId, DomainPort, HealthCheckable, InvoiceId, PortError, ProjectId,
    UserId,
};

use crate::activity::ActivityTrack;
use crate::contract::Contract;
use crate::invoice::Invoice;

/// Storage port for the billing domain
#[async_trait]
pub trait BillingPort: DomainPort + HealthCheckable {
    /// Fetches a contract by id, `None` if it does not exist
    async fn get_contract(&self, id: ContractId) -> Result<Option<Contract>, PortError>;

    /// Lists all contracts attached to a project
    async fn contracts_for_project(&self, project_id: ProjectId)
        -> Result<Vec<Contract>, PortError>;

    /// Lists all activity tracks for a user/project pairing
    async fn tracks_for_pairing(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Vec<ActivityTrack>, PortError>;

    /// Ids of tracks already claimed by an invoice entry on this project
    async fn invoiced_track_ids(
        &self,
        project_id: ProjectId,
    ) -> Result<HashSet<ActivityTrackId>, PortError>;

    /// Persists an invoice together with all of its entries, atomically
    ///
    /// Returns `PortError::Conflict` if any entry references a track
    /// already claimed by another invoice; in that case nothing is
    /// written.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// Fetches an invoice with its entries
    ///
    /// Returns `None` if the id does not exist or the invoice has been
    /// soft-deleted; deleted invoices never leave the storage layer.
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError>;

    /// Marks an invoice deleted without removing its rows
    ///
    /// Entries stay claimed: a soft-deleted invoice still blocks its
    /// tracks from being billed again.
    async fn soft_delete_invoice(&self, id: InvoiceId) -> Result<(), PortError>;

    /// Persists a contract
    async fn insert_contract(&self, contract: &Contract) -> Result<(), PortError>;

    /// Persists an activity track
    async fn insert_track(&self, track: &ActivityTrack) -> Result<(), PortError>;
}

/// Mock implementation of BillingPort for testing
///
/// Stores everything in memory and replicates the storage-level
/// uniqueness guarantee over invoiced tracks, so double-billing tests
/// behave like the real adapter.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of BillingPort
    #[derive(Debug, Default)]
    pub struct MockBillingPort {
        contracts: Arc<RwLock<HashMap<ContractId, Contract>>>,
        tracks: Arc<RwLock<HashMap<ActivityTrackId, ActivityTrack>>>,
        invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
        claimed_tracks: Arc<RwLock<HashSet<ActivityTrackId>>>,
    }

    impl MockBillingPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with contracts and tracks for testing
        pub async fn with_data(contracts: Vec<Contract>, tracks: Vec<ActivityTrack>) -> Self {
            let port = Self::new();
            {
                let mut map = port.contracts.write().await;
                for contract in contracts {
                    map.insert(contract.id, contract);
                }
            }
            {
                let mut map = port.tracks.write().await;
                for track in tracks {
                    map.insert(track.id, track);
                }
            }
            port
        }
    }

    impl DomainPort for MockBillingPort {}

    #[async_trait]
    impl HealthCheckable for MockBillingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-billing-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl BillingPort for MockBillingPort {
        async fn get_contract(&self, id: ContractId) -> Result<Option<Contract>, PortError> {
            Ok(self.contracts.read().await.get(&id).cloned())
        }

        async fn contracts_for_project(
            &self,
            project_id: ProjectId,
        ) -> Result<Vec<Contract>, PortError> {
            let contracts = self.contracts.read().await;
            let mut results: Vec<_> = contracts
                .values()
                .filter(|c| c.project_id == project_id)
                .cloned()
                .collect();
            results.sort_by_key(|c| c.id);
            Ok(results)
        }

        async fn tracks_for_pairing(
            &self,
            user_id: UserId,
            project_id: ProjectId,
        ) -> Result<Vec<ActivityTrack>, PortError> {
            let tracks = self.tracks.read().await;
            let mut results: Vec<_> = tracks
                .values()
                .filter(|t| t.user_id == user_id && t.project_id == project_id)
                .cloned()
                .collect();
            results.sort_by_key(|t| (t.from, t.id));
            Ok(results)
        }

        async fn invoiced_track_ids(
            &self,
            _project_id: ProjectId,
        ) -> Result<HashSet<ActivityTrackId>, PortError> {
            Ok(self.claimed_tracks.read().await.clone())
        }

        async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
            // Single write lock over the claim set stands in for the
            // database uniqueness constraint: check and claim together.
            let mut claimed = self.claimed_tracks.write().await;
            for entry in &invoice.entries {
                if claimed.contains(&entry.activity_track_id) {
                    return Err(PortError::conflict(format!(
                        "Activity track {} is already invoiced",
                        entry.activity_track_id
                    )));
                }
            }
            for entry in &invoice.entries {
                claimed.insert(entry.activity_track_id);
            }
            self.invoices
                .write()
                .await
                .insert(invoice.id, invoice.clone());
            Ok(())
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError> {
            Ok(self
                .invoices
                .read()
                .await
                .get(&id)
                .filter(|invoice| !invoice.is_deleted())
                .cloned())
        }

        async fn soft_delete_invoice(&self, id: InvoiceId) -> Result<(), PortError> {
            let mut invoices = self.invoices.write().await;
            match invoices.get_mut(&id) {
                Some(invoice) => {
                    invoice.soft_delete();
                    Ok(())
                }
                None => Err(PortError::not_found("Invoice", id)),
            }
        }

        async fn insert_contract(&self, contract: &Contract) -> Result<(), PortError> {
            self.contracts
                .write()
                .await
                .insert(contract.id, contract.clone());
            Ok(())
        }

        async fn insert_track(&self, track: &ActivityTrack) -> Result<(), PortError> {
            self.tracks.write().await.insert(track.id, track.clone());
            Ok(())
        }
    }
}
