//! Validation utilities for grove records
//!
//! Only basic checks live here: required selections and value ranges that
//! the entry forms enforce.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{BatchAction, PicklingDetails, TreeAction};

// ============================================================================
// Batch Validations
// ============================================================================

/// A batch must reference at least one tree
pub fn validate_tree_selection(tree_ids: &[Uuid]) -> Result<(), &'static str> {
    if tree_ids.is_empty() {
        return Err("Select at least one tree for the batch");
    }
    Ok(())
}

pub fn validate_pickling_details(details: &PicklingDetails) -> Result<(), &'static str> {
    if let Some(salt) = details.salt_percentage {
        validate_percentage(salt).map_err(|_| "Salt percentage must be between 0 and 100")?;
    }
    Ok(())
}

// ============================================================================
// Log Detail Validations
// ============================================================================

pub fn validate_tree_action(action: &TreeAction) -> Result<(), &'static str> {
    match action {
        TreeAction::Irrigation(d) => {
            if d.number_of_drippers.is_some_and(|n| n < 0) {
                return Err("Number of drippers cannot be negative");
            }
            validate_optional_non_negative(d.number_of_hours, "Irrigation hours cannot be negative")
        }
        TreeAction::Harvesting(d) => {
            validate_optional_non_negative(d.amount_kgs, "Harvested amount cannot be negative")
        }
        TreeAction::Flowering(d) => {
            for value in [d.percentage_initial, d.percentage_remaining].into_iter().flatten() {
                validate_percentage(value)
                    .map_err(|_| "Flowering percentages must be between 0 and 100")?;
            }
            Ok(())
        }
        TreeAction::Pruning(_)
        | TreeAction::Fertilizing(_)
        | TreeAction::Treatment(_)
        | TreeAction::Weather(_) => Ok(()),
    }
}

pub fn validate_batch_action(action: &BatchAction) -> Result<(), &'static str> {
    match action {
        BatchAction::TransportationGroveToPlant(d) | BatchAction::TransportationPlantToHome(d) => {
            validate_optional_non_negative(d.price, "Price cannot be negative")
        }
        BatchAction::Processing(d) => {
            validate_optional_non_negative(d.price, "Price cannot be negative")?;
            validate_optional_non_negative(d.weight_kgs, "Weight cannot be negative")?;
            validate_optional_non_negative(d.yield_liters, "Yield cannot be negative")?;
            if let Some(p) = d.percentage {
                validate_percentage(p).map_err(|_| "Percentage must be between 0 and 100")?;
            }
            Ok(())
        }
        BatchAction::Filtering(d) => validate_optional_non_negative(d.price, "Price cannot be negative"),
        BatchAction::Bottling(d) => validate_optional_non_negative(
            d.container_volume_liters,
            "Container volume cannot be negative",
        ),
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Percent value in 0..=100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

fn validate_optional_non_negative(
    value: Option<Decimal>,
    message: &'static str,
) -> Result<(), &'static str> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(message),
        _ => Ok(()),
    }
}

/// Planting year must be a plausible calendar year
pub fn validate_year_planted(year: i32) -> Result<(), &'static str> {
    if !(1000..=9999).contains(&year) {
        return Err("Year planted must be a four digit year");
    }
    Ok(())
}
