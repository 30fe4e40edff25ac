//! Per-investor flow summary

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Flow totals for one investor, or for the whole ledger in [`FlowSummary::totals`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorFlows {
    pub entity_id: String,
    pub entity_name: String,
    pub actual_inflows: BigDecimal,
    pub actual_outflows: BigDecimal,
    pub forecast_inflows: BigDecimal,
    pub forecast_outflows: BigDecimal,
    pub actual_net: BigDecimal,
    pub forecast_net: BigDecimal,
    pub total_net: BigDecimal,
}

impl InvestorFlows {
    fn empty(entity_id: &str, entity_name: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            actual_inflows: BigDecimal::from(0),
            actual_outflows: BigDecimal::from(0),
            forecast_inflows: BigDecimal::from(0),
            forecast_outflows: BigDecimal::from(0),
            actual_net: BigDecimal::from(0),
            forecast_net: BigDecimal::from(0),
            total_net: BigDecimal::from(0),
        }
    }

    fn add(&mut self, record: &CanonicalRecord) {
        let bucket = match (record.is_forecast, record.direction) {
            (false, Direction::Inflow) => &mut self.actual_inflows,
            (false, Direction::Outflow) => &mut self.actual_outflows,
            (true, Direction::Inflow) => &mut self.forecast_inflows,
            (true, Direction::Outflow) => &mut self.forecast_outflows,
        };
        *bucket += &record.amount;
    }

    fn absorb(&mut self, other: &InvestorFlows) {
        self.actual_inflows += &other.actual_inflows;
        self.actual_outflows += &other.actual_outflows;
        self.forecast_inflows += &other.forecast_inflows;
        self.forecast_outflows += &other.forecast_outflows;
    }

    fn finish(&mut self) {
        self.actual_net = &self.actual_inflows - &self.actual_outflows;
        self.forecast_net = &self.forecast_inflows - &self.forecast_outflows;
        self.total_net = &self.actual_net + &self.forecast_net;
    }
}

/// Per-investor rows sorted by `total_net` descending, plus a totals row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub rows: Vec<InvestorFlows>,
    pub totals: InvestorFlows,
}

/// Label of the totals row
pub const TOTAL_LABEL: &str = "TOTAL";

/// Summarise actual and forecast flows per investor.
///
/// Investors are keyed by ID; the display name is the last non-empty name seen
/// in ledger order. Ties on `total_net` are broken by name, then ID.
pub fn investor_summary(ledger: &Ledger) -> FlowSummary {
    let mut order: Vec<String> = Vec::new();
    let mut by_investor: HashMap<String, InvestorFlows> = HashMap::new();

    for record in ledger {
        let flows = by_investor
            .entry(record.entity_id.clone())
            .or_insert_with(|| {
                order.push(record.entity_id.clone());
                InvestorFlows::empty(&record.entity_id, &record.entity_name)
            });
        if !record.entity_name.trim().is_empty() {
            flows.entity_name = record.entity_name.clone();
        }
        flows.add(record);
    }

    let mut totals = InvestorFlows::empty(TOTAL_LABEL, TOTAL_LABEL);
    let mut rows: Vec<InvestorFlows> = order
        .iter()
        .filter_map(|id| by_investor.remove(id))
        .map(|mut flows| {
            flows.finish();
            totals.absorb(&flows);
            flows
        })
        .collect();
    totals.finish();

    rows.sort_by(|a, b| {
        b.total_net
            .cmp(&a.total_net)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });

    FlowSummary { rows, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, name: &str, direction: Direction, amount: i64, forecast: bool) -> CanonicalRecord {
        CanonicalRecord {
            is_forecast: forecast,
            ..CanonicalRecord::actual(
                id.to_string(),
                name.to_string(),
                "Feeder A".to_string(),
                direction,
                BigDecimal::from(amount),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
        }
    }

    #[test]
    fn test_empty_ledger() {
        let summary = investor_summary(&Ledger::new());
        assert!(summary.rows.is_empty());
        assert_eq!(summary.totals.total_net, BigDecimal::from(0));
        assert_eq!(summary.totals.entity_name, TOTAL_LABEL);
    }

    #[test]
    fn test_rows_and_totals() {
        let ledger = Ledger::from_records(vec![
            record("INV001", "Alpha", Direction::Inflow, 500, false),
            record("INV001", "Alpha", Direction::Outflow, 100, false),
            record("INV001", "Alpha", Direction::Inflow, 50, true),
            record("INV002", "Beta", Direction::Outflow, 300, false),
            record("INV003", "Gamma", Direction::Inflow, 900, true),
            record("INV003", "Gamma", Direction::Outflow, 100, true),
        ]);
        let summary = investor_summary(&ledger);

        let ids: Vec<_> = summary.rows.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["INV003", "INV001", "INV002"]);

        let alpha = &summary.rows[1];
        assert_eq!(alpha.actual_net, BigDecimal::from(400));
        assert_eq!(alpha.forecast_net, BigDecimal::from(50));
        assert_eq!(alpha.total_net, BigDecimal::from(450));

        for row in &summary.rows {
            assert_eq!(row.actual_net, &row.actual_inflows - &row.actual_outflows);
            assert_eq!(row.total_net, &row.actual_net + &row.forecast_net);
        }

        let row_sum: BigDecimal = summary.rows.iter().map(|r| r.total_net.clone()).sum();
        assert_eq!(summary.totals.total_net, row_sum);
        assert_eq!(summary.totals.actual_inflows, BigDecimal::from(500));
        assert_eq!(summary.totals.forecast_inflows, BigDecimal::from(950));
    }

    #[test]
    fn test_ties_sort_by_name() {
        let ledger = Ledger::from_records(vec![
            record("INV009", "Zulu", Direction::Inflow, 10, false),
            record("INV008", "Echo", Direction::Inflow, 10, false),
        ]);
        let summary = investor_summary(&ledger);
        assert_eq!(summary.rows[0].entity_name, "Echo");
        assert_eq!(summary.rows[1].entity_name, "Zulu");
    }

    #[test]
    fn test_latest_name_wins() {
        let mut renamed = record("INV001", "Alpha Pension Fund", Direction::Inflow, 10, false);
        renamed.occurred_on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let ledger = Ledger::from_records(vec![
            record("INV001", "Alpha", Direction::Inflow, 10, false),
            renamed,
            record("INV001", "", Direction::Inflow, 10, true),
        ]);
        let summary = investor_summary(&ledger);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].entity_name, "Alpha Pension Fund");
    }
}
