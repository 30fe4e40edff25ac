// Property-based tests for report reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use proptest::prelude::*;

use fundflow_core::{
    CanonicalRecord, CellValue, Direction, Ledger, RawReport, ReconciliationEngine,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn headers() -> Vec<String> {
    [
        "Unique ID",
        "Investor Name",
        "Fund Type",
        "Amount",
        "Transaction Date",
        "Transaction Type",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

/// Mostly valid amounts, sometimes garbage
fn arb_amount() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => r"[1-9][0-9]{0,5}(\.[0-9]{1,2})?",
        1 => r"\([1-9][0-9]{0,3}\)",
        1 => r"[a-z]{1,4}",
        1 => Just(String::new()),
    ]
}

/// Mostly valid day-first dates in 2024, sometimes garbage
fn arb_date() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => (1u32..=12, 1u32..=28).prop_map(|(m, d)| format!("{d:02}/{m:02}/2024")),
        1 => Just("soon".to_string()),
    ]
}

fn arb_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Subscription".to_string()),
        Just("Additional Subscription".to_string()),
        Just("Redemption".to_string()),
        Just("Transfer Out".to_string()),
        Just("Capital Call".to_string()),
        Just("Distribution".to_string()),
        Just("Fee Rebate".to_string()),
    ]
}

fn arb_row() -> impl Strategy<Value = Vec<CellValue>> {
    (
        prop_oneof![5 => "INV00[1-5]", 1 => Just(String::new())],
        arb_amount(),
        arb_date(),
        arb_type(),
    )
        .prop_map(|(id, amount, date, kind)| {
            vec![
                CellValue::text(id.clone()),
                CellValue::text(format!("Investor {id}")),
                CellValue::text("Feeder A"),
                CellValue::text(amount),
                CellValue::text(date),
                CellValue::text(kind),
            ]
        })
}

fn arb_report() -> impl Strategy<Value = RawReport> {
    prop::collection::vec(arb_row(), 0..25).prop_map(|rows| RawReport::from_rows(headers(), rows))
}

fn arb_forecasts() -> impl Strategy<Value = Ledger> {
    prop::collection::vec(
        ("INV00[1-5]", 1u32..=12, 1u32..=28, 1i64..100_000, any::<bool>()),
        0..6,
    )
    .prop_map(|items| {
        let records = items
            .into_iter()
            .map(|(id, m, d, amount, inflow)| {
                CanonicalRecord::forecast(
                    id.clone(),
                    format!("Investor {id}"),
                    "Feeder B".to_string(),
                    if inflow { Direction::Inflow } else { Direction::Outflow },
                    BigDecimal::from(amount),
                    NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
                )
            })
            .collect();
        Ledger::from_records(records)
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn reprocessing_adds_nothing(report in arb_report(), forecasts in arb_forecasts()) {
        let engine = ReconciliationEngine::default();
        let first = engine.process_raw_report(&report, &forecasts).unwrap();
        let second = engine.process_raw_report(&report, &first.ledger).unwrap();

        prop_assert_eq!(second.stats.new_entries, 0);
        prop_assert_eq!(second.ledger, first.ledger);
    }

    #[test]
    fn forecasts_are_preserved(report in arb_report(), forecasts in arb_forecasts()) {
        let engine = ReconciliationEngine::default();
        let outcome = engine.process_raw_report(&report, &forecasts).unwrap();

        let before: Vec<_> = forecasts.forecasts().cloned().collect();
        let after: Vec<_> = outcome.ledger.forecasts().cloned().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn every_row_is_accounted_for(report in arb_report(), forecasts in arb_forecasts()) {
        let engine = ReconciliationEngine::default();
        let first = engine.process_raw_report(&report, &forecasts).unwrap();
        let outcome = engine.process_raw_report(&report, &first.ledger).unwrap();

        for (input, result) in [(&forecasts, &first), (&first.ledger, &outcome)] {
            let stats = &result.stats;
            prop_assert_eq!(
                stats.new_entries
                    + stats.skipped_duplicate
                    + stats.skipped_unclassified
                    + stats.skipped_unparseable,
                report.len()
            );
            prop_assert_eq!(stats.total_records, input.len() + stats.new_entries);
            prop_assert_eq!(result.ledger.len(), stats.total_records);
            prop_assert_eq!(
                result.issues.len(),
                report.len() - stats.new_entries
            );
        }
    }

    #[test]
    fn net_flow_matches_new_records(report in arb_report()) {
        let engine = ReconciliationEngine::default();
        let outcome = engine.process_raw_report(&report, &Ledger::new()).unwrap();
        let stats = &outcome.stats;

        prop_assert_eq!(&stats.net_flow, &(&stats.inflow_amount - &stats.outflow_amount));

        let ledger_net: BigDecimal = outcome.ledger.iter().map(|r| r.signed_amount()).sum();
        prop_assert_eq!(&stats.net_flow, &ledger_net);
    }

    #[test]
    fn ledger_stays_sorted(report in arb_report(), forecasts in arb_forecasts()) {
        let engine = ReconciliationEngine::default();
        let outcome = engine.process_raw_report(&report, &forecasts).unwrap();

        prop_assert!(outcome.ledger.is_sorted());
        prop_assert!(outcome.ledger.iter().all(|r| r.amount >= BigDecimal::from(0)));
    }
}
