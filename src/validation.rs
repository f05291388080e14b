//! Input validation for roster planning.
//!
//! Checks structural integrity of the reference tables and the availability
//! map before anything is scheduled. Detects:
//! - Duplicate operator, station, and product IDs
//! - Training and time-study rows referencing unknown entities
//! - Negative capacities and standard times, zero-slot stations
//! - Availability naming operators that do not exist
//!
//! Every problem is collected so a planner can fix the source data in one
//! pass; callers that only need a yes/no take the first error.

use crate::error::{DataIntegrityError, IntegrityKind};
use crate::models::{AvailabilityMap, ReferenceData};
use std::collections::HashSet;

/// Validation result: all detected integrity errors.
pub type ValidationResult = Result<(), Vec<DataIntegrityError>>;

/// Validates the reference tables.
///
/// Checks:
/// 1. No duplicate operator, station, or product IDs
/// 2. Operator daily capacity is non-negative
/// 3. Station capacity is at least 1
/// 4. Training rows reference known operators and stations
/// 5. Time studies reference known stations and products
/// 6. Standard times are non-negative, one per (station, product)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_reference_data(data: &ReferenceData) -> ValidationResult {
    let mut errors = Vec::new();

    let operator_ids = collect_ids(
        data.operators.iter().map(|o| o.id.as_str()),
        "operators",
        &mut errors,
    );
    let station_ids = collect_ids(
        data.stations.iter().map(|s| s.id.as_str()),
        "stations",
        &mut errors,
    );
    let product_ids = collect_ids(
        data.products.iter().map(|p| p.id.as_str()),
        "products",
        &mut errors,
    );

    for op in &data.operators {
        if op.daily_minutes < 0 {
            errors.push(DataIntegrityError::new(
                IntegrityKind::NegativeValue,
                "operators",
                "daily_minutes",
                &op.id,
            ));
        }
    }

    for st in &data.stations {
        if st.capacity < 0 {
            errors.push(DataIntegrityError::new(
                IntegrityKind::NegativeValue,
                "stations",
                "capacity",
                &st.id,
            ));
        } else if st.capacity == 0 {
            errors.push(DataIntegrityError::new(
                IntegrityKind::ZeroCapacity,
                "stations",
                "capacity",
                &st.id,
            ));
        }
    }

    for t in &data.training {
        if !operator_ids.contains(t.operator_id.as_str()) {
            errors.push(DataIntegrityError::unknown(
                "training",
                "operator_id",
                &t.operator_id,
            ));
        }
        if !station_ids.contains(t.station_id.as_str()) {
            errors.push(DataIntegrityError::unknown(
                "training",
                "station_id",
                &t.station_id,
            ));
        }
    }

    let mut studied = HashSet::new();
    for ts in &data.time_studies {
        if !studied.insert((ts.station_id.as_str(), ts.product_id.as_str())) {
            errors.push(DataIntegrityError::new(
                IntegrityKind::DuplicateId,
                "time_studies",
                "station_id/product_id",
                format!("{}/{}", ts.station_id, ts.product_id),
            ));
        }
        if !station_ids.contains(ts.station_id.as_str()) {
            errors.push(DataIntegrityError::unknown(
                "time_studies",
                "station_id",
                &ts.station_id,
            ));
        }
        if !product_ids.contains(ts.product_id.as_str()) {
            errors.push(DataIntegrityError::unknown(
                "time_studies",
                "product_id",
                &ts.product_id,
            ));
        }
        if ts.minutes_per_unit < 0 {
            errors.push(DataIntegrityError::new(
                IntegrityKind::NegativeValue,
                "time_studies",
                "minutes_per_unit",
                format!("{}/{}", ts.station_id, ts.product_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every operator in the availability map exists.
pub fn validate_availability(availability: &AvailabilityMap, data: &ReferenceData) -> ValidationResult {
    let known: HashSet<&str> = data.operators.iter().map(|o| o.id.as_str()).collect();

    let mut reported = HashSet::new();
    let errors: Vec<DataIntegrityError> = availability
        .iter()
        .filter(|(_, op)| !known.contains(op) && reported.insert(*op))
        .map(|(_, op)| DataIntegrityError::unknown("availability", "operator_id", op))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    entity: &'static str,
    errors: &mut Vec<DataIntegrityError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(DataIntegrityError::new(
                IntegrityKind::DuplicateId,
                entity,
                "id",
                id,
            ));
        }
    }
    seen
}
