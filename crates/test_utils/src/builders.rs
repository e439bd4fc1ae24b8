//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. Tests specify only the relevant fields while using defaults
//! for everything else.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{Currency, DiscountPercentage, Money, ProjectId, UserId};
use domain_billing::{ActivityTrack, Contract, Invoice, NewInvoice};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{DocumentFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for test contracts
pub struct ContractBuilder {
    user_id: UserId,
    project_id: ProjectId,
    activity: String,
    active_from: NaiveDate,
    ends_at: Option<NaiveDate>,
    user_rate: Money,
    project_rate: Money,
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractBuilder {
    /// Creates a builder for a contract active through calendar 2024
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            project_id: ProjectId::new(),
            activity: "Developer".to_string(),
            active_from: TemporalFixtures::contract_start(),
            ends_at: Some(TemporalFixtures::contract_end()),
            user_rate: MoneyFixtures::eur_rate_60(),
            project_rate: MoneyFixtures::eur_rate_100(),
        }
    }

    pub fn with_user_id(mut self, id: UserId) -> Self {
        self.user_id = id;
        self
    }

    pub fn with_project_id(mut self, id: ProjectId) -> Self {
        self.project_id = id;
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn with_active_range(mut self, from: NaiveDate, to: Option<NaiveDate>) -> Self {
        self.active_from = from;
        self.ends_at = to;
        self
    }

    pub fn with_project_rate(mut self, rate: Money) -> Self {
        self.project_rate = rate;
        self
    }

    pub fn open_ended(mut self) -> Self {
        self.ends_at = None;
        self
    }

    pub fn build(self) -> Contract {
        Contract::new(
            self.user_id,
            self.project_id,
            self.activity,
            self.active_from,
            self.ends_at,
            self.user_rate,
            self.project_rate,
        )
        .expect("builder produced invalid contract")
    }
}

/// Builder for test activity tracks
pub struct ActivityTrackBuilder {
    user_id: UserId,
    project_id: ProjectId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    description: Option<String>,
}

impl Default for ActivityTrackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTrackBuilder {
    /// Creates a builder for an eight-hour day inside March 2024
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            project_id: ProjectId::new(),
            from: TemporalFixtures::work_start(5),
            to: TemporalFixtures::work_end(5),
            description: None,
        }
    }

    /// Pairs the track with a contract's user and project
    pub fn for_contract(mut self, contract: &Contract) -> Self {
        self.user_id = contract.user_id;
        self.project_id = contract.project_id;
        self
    }

    pub fn with_span(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Moves the track to the given March 2024 work day
    pub fn on_day(mut self, day: u32) -> Self {
        self.from = TemporalFixtures::work_start(day);
        self.to = TemporalFixtures::work_end(day);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> ActivityTrack {
        ActivityTrack::new(
            self.user_id,
            self.project_id,
            self.from,
            self.to,
            self.description,
        )
        .expect("builder produced invalid track")
    }
}

/// Builder for test invoices (without entries)
pub struct InvoiceBuilder {
    project_id: ProjectId,
    user_id: UserId,
    discount: Decimal,
    currency: Currency,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            project_id: ProjectId::new(),
            user_id: UserId::new(),
            discount: dec!(0),
            currency: Currency::EUR,
        }
    }

    /// Targets the invoice at a contract's user and project
    pub fn for_contract(mut self, contract: &Contract) -> Self {
        self.project_id = contract.project_id;
        self.user_id = contract.user_id;
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn build(self) -> Invoice {
        Invoice::new(NewInvoice {
            project_id: self.project_id,
            user_id: self.user_id,
            period: TemporalFixtures::march_2024(),
            discount_percentage: DiscountPercentage::new(self.discount)
                .expect("builder given invalid discount"),
            currency: self.currency,
            document: DocumentFixtures::pdf_handle(),
        })
    }
}
