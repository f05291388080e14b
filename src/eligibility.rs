//! Eligibility resolution.
//!
//! Derives, from the training and time-study tables, who may work where and
//! how long one unit takes. An operator can produce a product at a station
//! iff they hold a qualified training row for the station AND a positive
//! standard time exists for (station, product).
//!
//! A missing or zero time study is not an integrity error: the product is
//! simply unplaceable at that station.

use std::collections::HashMap;

use crate::error::DataIntegrityError;
use crate::models::ReferenceData;
use crate::validation::validate_reference_data;

/// Read-only lookup built once per run and shared by every proposal.
#[derive(Debug, Clone, Default)]
pub struct EligibilityResolver {
    /// operator → station → optional training level (qualified rows only).
    trained: HashMap<String, HashMap<String, Option<f64>>>,
    /// (station, product) → minutes per unit.
    standard_times: HashMap<(String, String), i64>,
    /// Station identifiers in reference order.
    stations: Vec<String>,
}

impl EligibilityResolver {
    /// Builds the resolver, rejecting malformed reference data.
    ///
    /// # Errors
    /// The first [`DataIntegrityError`] found by
    /// [`validate_reference_data`](crate::validation::validate_reference_data).
    pub fn new(data: &ReferenceData) -> Result<Self, DataIntegrityError> {
        if let Err(mut errors) = validate_reference_data(data) {
            for e in &errors {
                tracing::warn!(error = %e, "reference data integrity error");
            }
            return Err(errors.swap_remove(0));
        }
        Ok(Self::from_validated(data))
    }

    /// Builds the resolver from data already known to be valid.
    pub(crate) fn from_validated(data: &ReferenceData) -> Self {
        let mut trained: HashMap<String, HashMap<String, Option<f64>>> = HashMap::new();
        for entry in data.training.iter().filter(|t| t.qualified) {
            trained
                .entry(entry.operator_id.clone())
                .or_default()
                .insert(entry.station_id.clone(), entry.level);
        }

        let standard_times = data
            .time_studies
            .iter()
            .map(|ts| {
                (
                    (ts.station_id.clone(), ts.product_id.clone()),
                    ts.minutes_per_unit,
                )
            })
            .collect();

        Self {
            trained,
            standard_times,
            stations: data.stations.iter().map(|s| s.id.clone()).collect(),
        }
    }

    /// Whether the operator holds a qualified training row for the station.
    pub fn is_trained(&self, operator_id: &str, station_id: &str) -> bool {
        self.trained
            .get(operator_id)
            .is_some_and(|stations| stations.contains_key(station_id))
    }

    /// Recorded training level, if the operator is qualified and a level was given.
    pub fn training_level(&self, operator_id: &str, station_id: &str) -> Option<f64> {
        self.trained.get(operator_id)?.get(station_id).copied().flatten()
    }

    /// Minutes to produce one unit of the product at the station.
    pub fn standard_time(&self, station_id: &str, product_id: &str) -> Option<i64> {
        self.standard_times
            .get(&(station_id.to_string(), product_id.to_string()))
            .copied()
    }

    /// Whether the operator can produce the product at the station.
    pub fn can_produce(&self, operator_id: &str, station_id: &str, product_id: &str) -> bool {
        self.is_trained(operator_id, station_id)
            && self
                .standard_time(station_id, product_id)
                .is_some_and(|minutes| minutes > 0)
    }

    /// Stations (in reference order) where the product has a positive standard time.
    pub fn producible_stations(&self, product_id: &str) -> Vec<&str> {
        self.stations
            .iter()
            .filter(|s| self.standard_time(s, product_id).is_some_and(|m| m > 0))
            .map(String::as_str)
            .collect()
    }

    /// Longest positive standard time of the product over all stations.
    pub fn longest_standard_time(&self, product_id: &str) -> Option<i64> {
        self.producible_stations(product_id)
            .into_iter()
            .filter_map(|s| self.standard_time(s, product_id))
            .max()
    }
}
