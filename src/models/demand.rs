//! Demand models.
//!
//! Upstream demand arrives at a periodic grain (monthly, sometimes weekly).
//! The demand translator turns it into a [`WeeklyDemand`] for the planned week.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Period a demand row covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DemandPeriod {
    /// Calendar month.
    Month { year: i32, month: u32 },
    /// ISO week.
    IsoWeek { year: i32, week: u32 },
}

impl fmt::Display for DemandPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
            Self::IsoWeek { year, week } => write!(f, "{year}-W{week:02}"),
        }
    }
}

/// One row of the demand table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRow {
    pub product_id: String,
    pub period: DemandPeriod,
    /// Requested units. `NaN` marks a non-numeric cell in the source data.
    pub quantity: f64,
}

impl DemandRow {
    /// Monthly demand row.
    pub fn monthly(product_id: impl Into<String>, year: i32, month: u32, quantity: f64) -> Self {
        Self {
            product_id: product_id.into(),
            period: DemandPeriod::Month { year, month },
            quantity,
        }
    }

    /// Weekly demand row for an ISO week.
    pub fn weekly(product_id: impl Into<String>, year: i32, week: u32, quantity: f64) -> Self {
        Self {
            product_id: product_id.into(),
            period: DemandPeriod::IsoWeek { year, week },
            quantity,
        }
    }
}

/// Required units per product for one week.
///
/// Ordered by product identifier so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyDemand {
    units: BTreeMap<String, u32>,
}

impl WeeklyDemand {
    /// Creates empty demand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the required units of a product (replacing any previous value).
    pub fn with(mut self, product_id: impl Into<String>, units: u32) -> Self {
        self.units.insert(product_id.into(), units);
        self
    }

    /// Adds units to a product, saturating at `u32::MAX`.
    pub fn add(&mut self, product_id: impl Into<String>, units: u32) {
        let total = self.units.entry(product_id.into()).or_insert(0);
        *total = total.saturating_add(units);
    }

    /// Required units of a product (0 if absent).
    pub fn units(&self, product_id: &str) -> u32 {
        self.units.get(product_id).copied().unwrap_or(0)
    }

    /// Iterates `(product, units)` in product order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.units.iter().map(|(p, &u)| (p.as_str(), u))
    }

    /// Total units across all products.
    pub fn total_units(&self) -> u64 {
        self.units.values().map(|&u| u as u64).sum()
    }

    /// Number of products with an entry.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<(String, u32)> for WeeklyDemand {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        let mut demand = Self::new();
        for (product, units) in iter {
            demand.add(product, units);
        }
        demand
    }
}
