//! Reference tables: time studies, training, and the bundle holding them.
//!
//! These are the already-typed rows produced by an external loader. The
//! planner treats a [`ReferenceData`] as read-only and shares it across
//! all proposals of a run.

use serde::{Deserialize, Serialize};

use super::{Operator, Product, Station};

/// Standard time to produce one unit of a product at a station.
///
/// A missing (station, product) pair means the product cannot be made there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStudy {
    pub station_id: String,
    pub product_id: String,
    /// Minutes per unit.
    pub minutes_per_unit: i64,
}

/// Training record: whether an operator may work a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub operator_id: String,
    pub station_id: String,
    /// Qualification flag. `false` rows are kept for traceability only.
    pub qualified: bool,
    /// Optional proficiency (0.0 to 1.0).
    pub level: Option<f64>,
}

impl TimeStudy {
    /// Creates a time study row.
    pub fn new(
        station_id: impl Into<String>,
        product_id: impl Into<String>,
        minutes_per_unit: i64,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            product_id: product_id.into(),
            minutes_per_unit,
        }
    }
}

impl TrainingEntry {
    /// Creates a qualified training row.
    pub fn qualified(operator_id: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            station_id: station_id.into(),
            qualified: true,
            level: None,
        }
    }

    /// Creates a row recording that the operator is *not* qualified.
    pub fn unqualified(operator_id: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            qualified: false,
            ..Self::qualified(operator_id, station_id)
        }
    }

    /// Sets the proficiency level, clamped to `[0, 1]`.
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = Some(level.clamp(0.0, 1.0));
        self
    }
}

/// Normalized reference tables for one planning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub operators: Vec<Operator>,
    pub stations: Vec<Station>,
    pub products: Vec<Product>,
    pub training: Vec<TrainingEntry>,
    pub time_studies: Vec<TimeStudy>,
}

impl ReferenceData {
    /// Creates empty reference data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operator.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    /// Adds a station.
    pub fn with_station(mut self, station: Station) -> Self {
        self.stations.push(station);
        self
    }

    /// Adds a product.
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Adds a training row.
    pub fn with_training(mut self, entry: TrainingEntry) -> Self {
        self.training.push(entry);
        self
    }

    /// Adds a time study row.
    pub fn with_time_study(mut self, study: TimeStudy) -> Self {
        self.time_studies.push(study);
        self
    }

    pub fn operator(&self, id: &str) -> Option<&Operator> {
        self.operators.iter().find(|o| o.id == id)
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
