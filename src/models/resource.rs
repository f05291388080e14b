//! Shop-floor resources: operators and stations.
//!
//! Operators are the people being rostered; stations (work centers) are the
//! places they work at. Both are loaded once per run and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A shop-floor operator.
///
/// Station eligibility is not stored here; it comes from the training
/// table (see [`TrainingEntry`](super::TrainingEntry)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    /// Unique operator identifier (badge / user code).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Minutes the operator can work on any single day.
    pub daily_minutes: i64,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

/// A station (work center) with limited concurrent operator slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Unique station identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Maximum number of operators working at the station at once.
    pub capacity: i32,
}

/// Default working day of an operator: eight hours.
pub const DEFAULT_DAILY_MINUTES: i64 = 480;

impl Operator {
    /// Creates an operator with an eight-hour working day.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            daily_minutes: DEFAULT_DAILY_MINUTES,
            attributes: HashMap::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the daily capacity in minutes.
    pub fn with_daily_minutes(mut self, minutes: i64) -> Self {
        self.daily_minutes = minutes;
        self
    }

    /// Sets the daily capacity in hours.
    pub fn with_daily_hours(self, hours: f64) -> Self {
        self.with_daily_minutes((hours * 60.0).round() as i64)
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Display label: name when set, identifier otherwise.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl Station {
    /// Creates a single-slot station.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity: 1,
        }
    }

    /// Sets the station name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of concurrent operator slots.
    pub fn with_capacity(mut self, capacity: i32) -> Self {
        self.capacity = capacity;
        self
    }
}
