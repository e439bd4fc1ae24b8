//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_billing::Invoice;
use rust_decimal::Decimal;

/// Asserts that two Money values are equal in amount and currency
///
/// # Panics
///
/// Panics with both values in the message on mismatch
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={}, expected={}",
        actual.amount(),
        expected.amount()
    );
}

/// Asserts that an invoice's totals satisfy the discount formula
///
/// Checks `total == subtotal * (100 - d) / 100` with exact decimal
/// arithmetic, and that entries are ordered ascending by span start.
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let subtotal = invoice.subtotal().amount();
    let d = invoice.discount_percentage.as_percentage();
    let expected_total = subtotal * (Decimal::from(100) - d) / Decimal::from(100);

    assert_eq!(
        invoice.total().amount().round_dp(4),
        expected_total.round_dp(4),
        "Invoice total does not match discount formula: subtotal={}, discount={}, total={}",
        subtotal,
        d,
        invoice.total().amount()
    );

    for window in invoice.entries.windows(2) {
        assert!(
            window[0].from <= window[1].from,
            "Invoice entries out of order: {} after {}",
            window[0].from,
            window[1].from
        );
    }

    for entry in &invoice.entries {
        assert_eq!(
            entry.rate.currency(),
            invoice.currency,
            "Entry currency {} differs from invoice currency {}",
            entry.rate.currency(),
            invoice.currency
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ActivityTrackBuilder, ContractBuilder, InvoiceBuilder};
    use domain_billing::invoice::{InvoiceEntry, RatePolicy};
    use rust_decimal_macros::dec;

    #[test]
    fn test_consistent_invoice_passes() {
        let contract = ContractBuilder::new().build();
        let invoice = InvoiceBuilder::new()
            .for_contract(&contract)
            .with_discount(dec!(10))
            .build();
        let entries: Vec<_> = [5, 6, 7]
            .iter()
            .map(|&day| {
                let track = ActivityTrackBuilder::new()
                    .for_contract(&contract)
                    .on_day(day)
                    .build();
                InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry)
            })
            .collect();
        let invoice = invoice.with_entries(entries).unwrap();

        assert_invoice_consistent(&invoice);
    }

    #[test]
    #[should_panic(expected = "Money amounts differ")]
    fn test_money_mismatch_panics() {
        let a = Money::new(dec!(100), core_kernel::Currency::EUR);
        let b = Money::new(dec!(101), core_kernel::Currency::EUR);
        assert_money_eq(&a, &b);
    }
}
