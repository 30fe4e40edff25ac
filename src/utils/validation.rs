//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Validate that an investor ID is valid
pub fn validate_entity_id(entity_id: &str) -> FlowResult<()> {
    if entity_id.trim().is_empty() {
        return Err(FlowError::Validation(
            "Investor ID cannot be empty".to_string(),
        ));
    }

    if entity_id.len() > 50 {
        return Err(FlowError::Validation(
            "Investor ID cannot exceed 50 characters".to_string(),
        ));
    }

    // Admin systems use alphanumerics plus a few separators
    if !entity_id
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(FlowError::Validation(format!(
            "Investor ID '{entity_id}' can only contain alphanumeric characters, dashes, underscores, dots and slashes"
        )));
    }

    Ok(())
}

/// Validate that an investor name is valid
pub fn validate_entity_name(name: &str) -> FlowResult<()> {
    if name.trim().is_empty() {
        return Err(FlowError::Validation(
            "Investor name cannot be empty".to_string(),
        ));
    }

    if name.len() > 200 {
        return Err(FlowError::Validation(
            "Investor name cannot exceed 200 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter validator for manually entered forecasts
pub struct EnhancedRecordValidator;

impl RecordValidator for EnhancedRecordValidator {
    fn validate_record(&self, record: &CanonicalRecord) -> FlowResult<()> {
        // Basic invariants
        record.validate()?;

        validate_entity_id(&record.entity_id)?;
        validate_entity_name(&record.entity_name)?;

        if record.amount == BigDecimal::from(0) {
            return Err(FlowError::Validation(
                "Forecast amount must be greater than zero".to_string(),
            ));
        }

        if record.category.trim().is_empty() {
            return Err(FlowError::Validation(
                "Fund type cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
