//! Folding new actual records into a ledger while keeping forecasts intact

use crate::traits::*;
use crate::types::*;

/// Pure merge operations over [`Ledger`] values
pub struct LedgerMerger;

impl LedgerMerger {
    /// Merge new actual rows into a ledger.
    ///
    /// Result order before sorting is `existing actuals ++ new rows ++ forecasts`;
    /// the stable sort by date keeps that order among records sharing a date.
    /// Forecast records pass through untouched.
    pub fn merge(existing: &Ledger, new_actuals: Vec<CanonicalRecord>) -> Ledger {
        let (forecasts, actuals): (Vec<_>, Vec<_>) = existing
            .iter()
            .cloned()
            .partition(|record| record.is_forecast);

        let mut combined = actuals;
        combined.reserve(new_actuals.len() + forecasts.len());
        combined.extend(new_actuals);
        combined.extend(forecasts);

        Ledger::from_records(combined)
    }

    /// Append a validated forecast record
    pub fn add_forecast(existing: &Ledger, forecast: CanonicalRecord) -> FlowResult<Ledger> {
        Self::add_forecast_with_validator(existing, forecast, &DefaultRecordValidator)
    }

    /// Append a forecast record after running a custom validator
    pub fn add_forecast_with_validator(
        existing: &Ledger,
        forecast: CanonicalRecord,
        validator: &dyn RecordValidator,
    ) -> FlowResult<Ledger> {
        if !forecast.is_forecast {
            return Err(FlowError::Validation(
                "Only forecast records can be added manually; actuals arrive through admin reports"
                    .to_string(),
            ));
        }
        validator.validate_record(&forecast)?;

        let mut records = existing.records().to_vec();
        records.push(forecast);
        Ok(Ledger::from_records(records))
    }
}
