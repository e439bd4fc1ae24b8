//! Comprehensive tests for domain_billing

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BillingPeriod, Currency, Money, ProjectId, UserId};

use domain_billing::activity::ActivityTrack;
use domain_billing::contract::Contract;
use domain_billing::invoice::{parse_discount, Invoice, InvoiceEntry, RatePolicy};
use domain_billing::resolver::qualifying_tracks;
use domain_billing::BillingError;

use test_utils::{
    assert_invoice_consistent, ActivityTrackBuilder, ContractBuilder, InvoiceBuilder,
    TemporalFixtures,
};

use std::collections::HashSet;

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn march() -> BillingPeriod {
    TemporalFixtures::march_2024()
}

fn test_contract(rate: Decimal) -> Contract {
    ContractBuilder::new()
        .with_project_rate(Money::new(rate, Currency::EUR))
        .build()
}

fn test_track(contract: &Contract, from: DateTime<Utc>, to: DateTime<Utc>) -> ActivityTrack {
    ActivityTrackBuilder::new()
        .for_contract(contract)
        .with_span(from, to)
        .build()
}

fn test_invoice(contract: &Contract, discount: Decimal) -> Invoice {
    InvoiceBuilder::new()
        .for_contract(contract)
        .with_discount(discount)
        .build()
}

// ============================================================================
// Resolution Tests
// ============================================================================

mod resolution_tests {
    use super::*;

    #[test]
    fn test_only_fully_contained_tracks_resolve() {
        let contract = test_contract(dec!(100));
        let inside = test_track(&contract, ts(2024, 3, 10, 9), ts(2024, 3, 10, 17));
        let before = test_track(&contract, ts(2024, 2, 10, 9), ts(2024, 2, 10, 17));
        let straddling = test_track(&contract, ts(2024, 2, 29, 22), ts(2024, 3, 1, 2));
        let tracks = vec![inside.clone(), before, straddling];

        let resolved = qualifying_tracks(&contract, &march(), &tracks, &HashSet::new());

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, inside.id);
    }

    #[test]
    fn test_boundary_tracks_resolve() {
        let contract = test_contract(dec!(100));
        let at_start = test_track(&contract, ts(2024, 3, 1, 0), ts(2024, 3, 1, 8));
        let at_end = test_track(&contract, ts(2024, 3, 31, 15), ts(2024, 3, 31, 23));
        let tracks = vec![at_start, at_end];

        let resolved = qualifying_tracks(&contract, &march(), &tracks, &HashSet::new());

        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_resolution_order_is_ascending_and_deterministic() {
        let contract = test_contract(dec!(100));
        let mut tracks = Vec::new();
        for day in (1..=20).rev() {
            tracks.push(test_track(
                &contract,
                ts(2024, 3, day, 9),
                ts(2024, 3, day, 17),
            ));
        }

        let resolved = qualifying_tracks(&contract, &march(), &tracks, &HashSet::new());

        let froms: Vec<_> = resolved.iter().map(|t| t.from).collect();
        let mut sorted = froms.clone();
        sorted.sort();
        assert_eq!(froms, sorted);
    }

    #[test]
    fn test_already_invoiced_tracks_do_not_resolve() {
        let contract = test_contract(dec!(100));
        let billed = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));
        let open = test_track(&contract, ts(2024, 3, 6, 9), ts(2024, 3, 6, 17));
        let tracks = vec![billed.clone(), open.clone()];
        let invoiced: HashSet<_> = [billed.id].into_iter().collect();

        let resolved = qualifying_tracks(&contract, &march(), &tracks, &invoiced);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, open.id);
    }

    #[test]
    fn test_contract_outside_period_resolves_nothing() {
        let contract = ContractBuilder::new()
            .with_active_range(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                Some(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()),
            )
            .build();
        let track = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));

        let tracks = [track];
        let resolved = qualifying_tracks(&contract, &march(), &tracks, &HashSet::new());

        assert!(resolved.is_empty());
    }
}

// ============================================================================
// Aggregation Tests
// ============================================================================

mod aggregation_tests {
    use super::*;

    fn entries_for(invoice: &Invoice, contract: &Contract, count: u32) -> Vec<InvoiceEntry> {
        (0..count)
            .map(|i| {
                let track = test_track(
                    contract,
                    ts(2024, 3, 5 + i, 9),
                    ts(2024, 3, 5 + i, 17),
                );
                InvoiceEntry::from_track(invoice.id, &track, contract, RatePolicy::FlatPerEntry)
            })
            .collect()
    }

    #[test]
    fn test_subtotal_and_total_worked_example() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(10));
        let entries = entries_for(&invoice, &contract, 3);

        let invoice = invoice.with_entries(entries).unwrap();

        assert_eq!(invoice.subtotal().amount(), dec!(300));
        assert_eq!(invoice.total().amount(), dec!(270));
        assert_invoice_consistent(&invoice);
    }

    #[test]
    fn test_awkward_discount_stays_exact() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(33));
        let entries = entries_for(&invoice, &contract, 3);

        let invoice = invoice.with_entries(entries).unwrap();

        // 300 * 67 / 100 = 201, no float drift
        assert_eq!(invoice.total().amount(), dec!(201));
    }

    #[test]
    fn test_entry_traceability() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(0));
        let track = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));

        let entry = InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry);

        assert_eq!(entry.invoice_id, invoice.id);
        assert_eq!(entry.activity_track_id, track.id);
        assert_eq!(entry.contract_id, contract.id);
    }

    #[test]
    fn test_regeneration_rejected() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(0));
        let entries = entries_for(&invoice, &contract, 2);

        let invoice = invoice.with_entries(entries.clone()).unwrap();
        let result = invoice.with_entries(entries);

        assert!(matches!(
            result,
            Err(BillingError::EntriesAlreadyGenerated(_))
        ));
    }

    #[test]
    fn test_empty_invoice_is_valid_with_zero_totals() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(50));

        assert!(invoice.entries.is_empty());
        assert!(invoice.subtotal().is_zero());
        assert!(invoice.total().is_zero());
    }
}

// ============================================================================
// Discount Tests
// ============================================================================

mod discount_tests {
    use super::*;

    #[test]
    fn test_discount_bounds() {
        assert!(parse_discount(dec!(0)).is_ok());
        assert!(parse_discount(dec!(100)).is_ok());
        assert!(parse_discount(dec!(-0.01)).is_err());
        assert!(parse_discount(dec!(100.01)).is_err());
    }

    #[test]
    fn test_discount_is_rejected_not_clamped() {
        let result = parse_discount(dec!(150));
        match result {
            Err(BillingError::Validation(msg)) => assert!(msg.contains("150")),
            other => panic!("Expected validation error, got {:?}", other.map(|d| d.as_percentage())),
        }
    }

    #[test]
    fn test_fractional_discount() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(12.5));
        let track = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));
        let entry = InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry);

        let invoice = invoice.with_entries(vec![entry]).unwrap();

        assert_eq!(invoice.total().amount(), dec!(87.5));
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_soft_deleted_invoice_keeps_entries() {
        let contract = test_contract(dec!(100));
        let invoice = test_invoice(&contract, dec!(0));
        let track = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));
        let entry = InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry);
        let mut invoice = invoice.with_entries(vec![entry]).unwrap();

        invoice.soft_delete();

        assert!(invoice.is_deleted());
        assert_eq!(invoice.entries.len(), 1);
        assert_eq!(invoice.subtotal().amount(), dec!(100));
    }

    #[test]
    fn test_owner_contract_bills_nothing() {
        let contract = Contract::owner(UserId::new(), ProjectId::new(), Currency::EUR);
        let invoice = InvoiceBuilder::new().for_contract(&contract).build();
        let track = test_track(&contract, ts(2024, 3, 5, 9), ts(2024, 3, 5, 17));
        let entry = InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry);

        let invoice = invoice.with_entries(vec![entry]).unwrap();

        // Zero rate on the owner contract makes the entry free
        assert!(invoice.total().is_zero());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_total_never_exceeds_subtotal(
            rate in 1u32..10_000,
            count in 0usize..10,
            discount in 0u32..=100,
        ) {
            let contract = test_contract(Decimal::from(rate));
            let invoice = test_invoice(&contract, Decimal::from(discount));
            let entries: Vec<_> = (0..count)
                .map(|i| {
                    let track = test_track(
                        &contract,
                        ts(2024, 3, 1 + i as u32, 9),
                        ts(2024, 3, 1 + i as u32, 17),
                    );
                    InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry)
                })
                .collect();
            let invoice = invoice.with_entries(entries).unwrap();

            prop_assert!(invoice.total().amount() <= invoice.subtotal().amount());
            prop_assert!(invoice.total().amount() >= Decimal::ZERO);
        }

        #[test]
        fn prop_total_matches_formula(
            rate in 1u32..10_000,
            count in 1usize..10,
            discount in 0u32..=100,
        ) {
            let contract = test_contract(Decimal::from(rate));
            let invoice = test_invoice(&contract, Decimal::from(discount));
            let entries: Vec<_> = (0..count)
                .map(|i| {
                    let track = test_track(
                        &contract,
                        ts(2024, 3, 1 + i as u32, 9),
                        ts(2024, 3, 1 + i as u32, 17),
                    );
                    InvoiceEntry::from_track(invoice.id, &track, &contract, RatePolicy::FlatPerEntry)
                })
                .collect();
            let invoice = invoice.with_entries(entries).unwrap();

            let expected = invoice.subtotal().amount()
                * (Decimal::from(100 - discount))
                / Decimal::from(100);
            prop_assert_eq!(invoice.total().amount().round_dp(4), expected.round_dp(4));
        }

        #[test]
        fn prop_resolution_is_a_subset_in_order(
            days in proptest::collection::vec(1u32..=28, 0..15),
        ) {
            let contract = test_contract(dec!(100));
            let tracks: Vec<_> = days
                .iter()
                .map(|&d| test_track(&contract, ts(2024, 3, d, 9), ts(2024, 3, d, 17)))
                .collect();

            let resolved = qualifying_tracks(&contract, &march(), &tracks, &HashSet::new());

            prop_assert_eq!(resolved.len(), tracks.len());
            for window in resolved.windows(2) {
                prop_assert!(window[0].from <= window[1].from);
            }
        }
    }
}
