//! Monthly net-flow series

use bigdecimal::BigDecimal;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Net flows for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// `YYYY-MM`
    pub month: String,
    pub actual_net: BigDecimal,
    pub forecast_net: BigDecimal,
}

/// Net inflow minus outflow per month, actuals and forecasts kept apart, ascending by month
pub fn monthly_net_flows(ledger: &Ledger) -> Vec<MonthlyFlow> {
    let mut months: BTreeMap<(i32, u32), (BigDecimal, BigDecimal)> = BTreeMap::new();

    for record in ledger {
        let key = (record.occurred_on.year(), record.occurred_on.month());
        let (actual, forecast) = months
            .entry(key)
            .or_insert_with(|| (BigDecimal::from(0), BigDecimal::from(0)));

        if record.is_forecast {
            *forecast += record.signed_amount();
        } else {
            *actual += record.signed_amount();
        }
    }

    months
        .into_iter()
        .map(|((year, month), (actual_net, forecast_net))| MonthlyFlow {
            month: format!("{year:04}-{month:02}"),
            actual_net,
            forecast_net,
        })
        .collect()
}
