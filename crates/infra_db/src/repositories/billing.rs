//! Billing repository implementation
//!
//! PostgreSQL adapter for the billing domain's `BillingPort`. Queries are
//! runtime-bound so the crate compiles without a live database; the
//! schema lives in `migrations/0001_billing.sql`.
//!
//! The double-billing guard is the `invoice_entries_track_uq` uniqueness
//! constraint: inserting an invoice whose entries reference an
//! already-billed activity track fails with a 23505, which surfaces to
//! the domain as a retryable conflict and rolls the whole transaction
//! back.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    ActiveRange, ActivityTrackId, AdapterHealth, BillingPeriod, ContractId, Currency,
    DiscountPercentage, DocumentHandle, DocumentId, DomainPort, HealthCheckResult,
    HealthCheckable, InvoiceEntryId, InvoiceId, Money, PortError, ProjectId, UserId,
};
use domain_billing::{ActivityTrack, BillingPort, Contract, Invoice, InvoiceEntry};

use crate::error::DatabaseError;

/// PostgreSQL implementation of the billing storage port
#[derive(Debug, Clone)]
pub struct PostgresBillingRepository {
    pool: PgPool,
}

impl PostgresBillingRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresBillingRepository {}

#[async_trait]
impl HealthCheckable for PostgresBillingRepository {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let status = match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => AdapterHealth::Healthy,
            Err(_) => AdapterHealth::Unhealthy,
        };
        HealthCheckResult {
            adapter_id: "postgres-billing-repository".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl BillingPort for PostgresBillingRepository {
    async fn get_contract(&self, id: ContractId) -> Result<Option<Contract>, PortError> {
        let row: Option<ContractRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, project_id, activity, active_from, ends_at,
                   user_rate, project_rate, currency, created_at, updated_at
            FROM contracts
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port_error)?;

        row.map(Contract::try_from).transpose()
    }

    async fn contracts_for_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Contract>, PortError> {
        let rows: Vec<ContractRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, project_id, activity, active_from, ends_at,
                   user_rate, project_rate, currency, created_at, updated_at
            FROM contracts
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(Uuid::from(project_id))
        .fetch_all(&self.pool)
        .await
        .map_err(to_port_error)?;

        rows.into_iter().map(Contract::try_from).collect()
    }

    async fn tracks_for_pairing(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Vec<ActivityTrack>, PortError> {
        let rows: Vec<ActivityTrackRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, project_id, from_time, to_time, description, created_at
            FROM activity_tracks
            WHERE user_id = $1 AND project_id = $2
            ORDER BY from_time, id
            "#,
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(project_id))
        .fetch_all(&self.pool)
        .await
        .map_err(to_port_error)?;

        Ok(rows.into_iter().map(ActivityTrack::from).collect())
    }

    async fn invoiced_track_ids(
        &self,
        project_id: ProjectId,
    ) -> Result<HashSet<ActivityTrackId>, PortError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT e.activity_track_id
            FROM invoice_entries e
            JOIN invoices i ON i.id = e.invoice_id
            WHERE i.project_id = $1
            "#,
        )
        .bind(Uuid::from(project_id))
        .fetch_all(&self.pool)
        .await
        .map_err(to_port_error)?;

        Ok(rows
            .into_iter()
            .map(|(id,)| ActivityTrackId::from(id))
            .collect())
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(to_port_error)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, project_id, user_id, period_start, period_end,
                discount_percentage, currency, document_id, document_filename,
                document_content_type, payment_document_id,
                payment_document_filename, payment_document_content_type,
                visible_for_user, visible_for_client,
                deleted_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                      $14, $15, $16, $17, $18)
            "#,
        )
        .bind(Uuid::from(invoice.id))
        .bind(Uuid::from(invoice.project_id))
        .bind(Uuid::from(invoice.user_id))
        .bind(invoice.period.start)
        .bind(invoice.period.end)
        .bind(invoice.discount_percentage.as_percentage())
        .bind(invoice.currency.code())
        .bind(Uuid::from(invoice.document.id))
        .bind(&invoice.document.filename)
        .bind(&invoice.document.content_type)
        .bind(invoice.payment_document.as_ref().map(|d| Uuid::from(d.id)))
        .bind(invoice.payment_document.as_ref().map(|d| d.filename.clone()))
        .bind(
            invoice
                .payment_document
                .as_ref()
                .map(|d| d.content_type.clone()),
        )
        .bind(invoice.visible_for_user)
        .bind(invoice.visible_for_client)
        .bind(invoice.deleted_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(to_port_error)?;

        for entry in &invoice.entries {
            sqlx::query(
                r#"
                INSERT INTO invoice_entries (
                    id, invoice_id, activity_track_id, contract_id,
                    rate, currency, quantity, description, from_time, to_time
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(Uuid::from(entry.id))
            .bind(Uuid::from(entry.invoice_id))
            .bind(Uuid::from(entry.activity_track_id))
            .bind(Uuid::from(entry.contract_id))
            .bind(entry.rate.amount())
            .bind(entry.rate.currency().code())
            .bind(entry.quantity)
            .bind(&entry.description)
            .bind(entry.from)
            .bind(entry.to)
            .execute(&mut *tx)
            .await
            .map_err(to_port_error)?;
        }

        tx.commit().await.map_err(to_port_error)?;

        debug!(entries = invoice.entries.len(), "Invoice persisted");
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError> {
        let row: Option<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, user_id, period_start, period_end,
                   discount_percentage, currency, document_id, document_filename,
                   document_content_type, payment_document_id,
                   payment_document_filename, payment_document_content_type,
                   visible_for_user, visible_for_client,
                   deleted_at, created_at, updated_at
            FROM invoices
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let entry_rows: Vec<InvoiceEntryRow> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, activity_track_id, contract_id,
                   rate, currency, quantity, description, from_time, to_time
            FROM invoice_entries
            WHERE invoice_id = $1
            ORDER BY from_time, activity_track_id
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(to_port_error)?;

        let mut invoice = Invoice::try_from(row)?;
        invoice.entries = entry_rows
            .into_iter()
            .map(InvoiceEntry::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Some(invoice))
    }

    async fn soft_delete_invoice(&self, id: InvoiceId) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(Uuid::from(id))
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Invoice", id));
        }
        Ok(())
    }

    async fn insert_contract(&self, contract: &Contract) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, user_id, project_id, activity, active_from, ends_at,
                user_rate, project_rate, currency, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::from(contract.id))
        .bind(Uuid::from(contract.user_id))
        .bind(Uuid::from(contract.project_id))
        .bind(&contract.activity)
        .bind(contract.active_range.active_from)
        .bind(contract.active_range.ends_at)
        .bind(contract.user_rate.amount())
        .bind(contract.project_rate.amount())
        .bind(contract.project_rate.currency().code())
        .bind(contract.created_at)
        .bind(contract.updated_at)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        Ok(())
    }

    async fn insert_track(&self, track: &ActivityTrack) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO activity_tracks (
                id, user_id, project_id, from_time, to_time, description, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(track.id))
        .bind(Uuid::from(track.user_id))
        .bind(Uuid::from(track.project_id))
        .bind(track.from)
        .bind(track.to)
        .bind(&track.description)
        .bind(track.created_at)
        .execute(&self.pool)
        .await
        .map_err(to_port_error)?;

        Ok(())
    }
}

/// Maps a SQLx error onto the port vocabulary via `DatabaseError`
fn to_port_error(error: sqlx::Error) -> PortError {
    PortError::from(DatabaseError::from(&error))
}

/// Database row for a contract
#[derive(Debug, Clone, FromRow)]
struct ContractRow {
    id: Uuid,
    user_id: Uuid,
    project_id: Uuid,
    activity: String,
    active_from: NaiveDate,
    ends_at: Option<NaiveDate>,
    user_rate: Decimal,
    project_rate: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContractRow> for Contract {
    type Error = PortError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        let currency = Currency::from_str(&row.currency)
            .map_err(|e| PortError::internal(e.to_string()))?;
        let active_range = ActiveRange::new(row.active_from, row.ends_at)
            .map_err(|e| PortError::internal(e.to_string()))?;

        Ok(Contract {
            id: ContractId::from(row.id),
            user_id: UserId::from(row.user_id),
            project_id: ProjectId::from(row.project_id),
            activity: row.activity,
            active_range,
            user_rate: Money::new(row.user_rate, currency),
            project_rate: Money::new(row.project_rate, currency),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for an activity track
#[derive(Debug, Clone, FromRow)]
struct ActivityTrackRow {
    id: Uuid,
    user_id: Uuid,
    project_id: Uuid,
    from_time: DateTime<Utc>,
    to_time: DateTime<Utc>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ActivityTrackRow> for ActivityTrack {
    fn from(row: ActivityTrackRow) -> Self {
        // The span check constraint ran at insert time; rows are trusted.
        ActivityTrack {
            id: ActivityTrackId::from(row.id),
            user_id: UserId::from(row.user_id),
            project_id: ProjectId::from(row.project_id),
            from: row.from_time,
            to: row.to_time,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Database row for an invoice header
#[derive(Debug, Clone, FromRow)]
struct InvoiceRow {
    id: Uuid,
    project_id: Uuid,
    user_id: Uuid,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    discount_percentage: Decimal,
    currency: String,
    document_id: Uuid,
    document_filename: String,
    document_content_type: String,
    payment_document_id: Option<Uuid>,
    payment_document_filename: Option<String>,
    payment_document_content_type: Option<String>,
    visible_for_user: bool,
    visible_for_client: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = PortError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let currency = Currency::from_str(&row.currency)
            .map_err(|e| PortError::internal(e.to_string()))?;
        let period = BillingPeriod::new(row.period_start, row.period_end)
            .map_err(|e| PortError::internal(e.to_string()))?;
        let discount_percentage = DiscountPercentage::new(row.discount_percentage)
            .map_err(|e| PortError::internal(e.to_string()))?;

        let payment_document = match (
            row.payment_document_id,
            row.payment_document_filename,
            row.payment_document_content_type,
        ) {
            (Some(id), Some(filename), Some(content_type)) => Some(DocumentHandle {
                id: DocumentId::from(id),
                filename,
                content_type,
            }),
            _ => None,
        };

        Ok(Invoice {
            id: InvoiceId::from(row.id),
            project_id: ProjectId::from(row.project_id),
            user_id: UserId::from(row.user_id),
            period,
            discount_percentage,
            currency,
            entries: Vec::new(),
            document: DocumentHandle {
                id: DocumentId::from(row.document_id),
                filename: row.document_filename,
                content_type: row.document_content_type,
            },
            payment_document,
            visible_for_user: row.visible_for_user,
            visible_for_client: row.visible_for_client,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for an invoice entry
#[derive(Debug, Clone, FromRow)]
struct InvoiceEntryRow {
    id: Uuid,
    invoice_id: Uuid,
    activity_track_id: Uuid,
    contract_id: Uuid,
    rate: Decimal,
    currency: String,
    quantity: Decimal,
    description: Option<String>,
    from_time: DateTime<Utc>,
    to_time: DateTime<Utc>,
}

impl TryFrom<InvoiceEntryRow> for InvoiceEntry {
    type Error = PortError;

    fn try_from(row: InvoiceEntryRow) -> Result<Self, Self::Error> {
        let currency = Currency::from_str(&row.currency)
            .map_err(|e| PortError::internal(e.to_string()))?;

        Ok(InvoiceEntry {
            id: InvoiceEntryId::from(row.id),
            invoice_id: InvoiceId::from(row.invoice_id),
            activity_track_id: ActivityTrackId::from(row.activity_track_id),
            contract_id: ContractId::from(row.contract_id),
            rate: Money::new(row.rate, currency),
            quantity: row.quantity,
            description: row.description,
            from: row.from_time,
            to: row.to_time,
        })
    }
}
