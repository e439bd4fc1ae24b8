//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the billing
//! system. These fixtures are designed to be consistent and predictable
//! for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{
    ActivityTrackId, BillingPeriod, ContractId, Currency, DiscountPercentage, DocumentHandle,
    DocumentId, InvoiceId, Money, ProjectId, UserId,
};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard hourly project rate
    pub fn eur_rate_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// Standard user rate, below the project rate
    pub fn eur_rate_60() -> Money {
        Money::new(dec!(60.00), Currency::EUR)
    }

    /// Zero amount, as carried by owner contracts
    pub fn eur_zero() -> Money {
        Money::zero(Currency::EUR)
    }

    /// USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for discount test data
pub struct DiscountFixtures;

impl DiscountFixtures {
    pub fn none() -> DiscountPercentage {
        DiscountPercentage::zero()
    }

    pub fn ten_percent() -> DiscountPercentage {
        DiscountPercentage::new(dec!(10)).expect("valid discount")
    }

    /// Awkward value that exposes float drift in total calculations
    pub fn thirty_three_percent() -> DiscountPercentage {
        DiscountPercentage::new(dec!(33)).expect("valid discount")
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The canonical test period: all of March 2024, UTC
    pub fn march_2024() -> BillingPeriod {
        BillingPeriod::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        )
        .expect("valid period")
    }

    /// A period one year after the canonical contract expires
    pub fn june_2025() -> BillingPeriod {
        BillingPeriod::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap(),
        )
        .expect("valid period")
    }

    /// Start of the canonical contract year
    pub fn contract_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// End of the canonical contract year
    pub fn contract_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    /// A work day inside the canonical period
    pub fn work_start(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    /// End of the same work day, eight hours later
    pub fn work_end(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 17, 0, 0).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn user_id() -> UserId {
        UserId::new()
    }

    pub fn project_id() -> ProjectId {
        ProjectId::new()
    }

    pub fn contract_id() -> ContractId {
        ContractId::new()
    }

    pub fn track_id() -> ActivityTrackId {
        ActivityTrackId::new()
    }

    pub fn invoice_id() -> InvoiceId {
        InvoiceId::new()
    }
}

/// Fixture for document test data
pub struct DocumentFixtures;

impl DocumentFixtures {
    pub fn pdf_handle() -> DocumentHandle {
        DocumentHandle {
            id: DocumentId::new(),
            filename: "invoice.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }
    }
}
