//! Error types.
//!
//! Two families of input errors abort a planning run: integrity problems in
//! the reference data (unknown identifiers, negative values) and malformed
//! demand figures. Demand that cannot be placed is *not* an error; it is
//! reported as an unscheduled remainder in the proposal summary.

use std::fmt;

use thiserror::Error;

/// Category of a reference-data integrity problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityKind {
    /// Two entities of the same table share an identifier.
    DuplicateId,
    /// A row references an identifier missing from its table.
    UnknownReference,
    /// A duration or capacity is negative.
    NegativeValue,
    /// A station declares no operator slots.
    ZeroCapacity,
}

impl fmt::Display for IntegrityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DuplicateId => "duplicate id",
            Self::UnknownReference => "unknown reference",
            Self::NegativeValue => "negative value",
            Self::ZeroCapacity => "zero capacity",
        };
        f.write_str(label)
    }
}

/// A reference-data integrity error.
///
/// Names the table (`entity`), the column (`field`) and the offending
/// identifier so the source data can be fixed by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in {entity}.{field}: '{id}'")]
pub struct DataIntegrityError {
    /// Error category.
    pub kind: IntegrityKind,
    /// Table the problem was found in (e.g. "training").
    pub entity: &'static str,
    /// Column holding the bad value (e.g. "operator_id").
    pub field: &'static str,
    /// Offending identifier (or the owning row's identifier for bad values).
    pub id: String,
}

impl DataIntegrityError {
    /// Creates a new integrity error.
    pub fn new(
        kind: IntegrityKind,
        entity: &'static str,
        field: &'static str,
        id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity,
            field,
            id: id.into(),
        }
    }

    /// An identifier that does not exist in the referenced table.
    pub fn unknown(entity: &'static str, field: &'static str, id: impl Into<String>) -> Self {
        Self::new(IntegrityKind::UnknownReference, entity, field, id)
    }
}

/// Malformed demand figures, detected before translation to weekly demand.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidDemandError {
    /// Quantity below zero.
    #[error("demand for product '{product}' is negative: {quantity}")]
    Negative { product: String, quantity: f64 },
    /// Quantity is NaN or infinite (a non-numeric cell upstream).
    #[error("demand for product '{product}' is not a finite number")]
    NotNumeric { product: String },
    /// Month outside 1..=12 or ISO week that does not exist.
    #[error("demand for product '{product}' has an invalid period: {period}")]
    InvalidPeriod { product: String, period: String },
    /// Demand multiplier is negative or not finite.
    #[error("demand multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),
}

/// Planner configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML syntax or schema error.
    #[error("failed to parse planner config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value outside its allowed range.
    #[error("invalid planner config (field={field}): {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Any error that aborts a planning run.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error(transparent)]
    InvalidDemand(#[from] InvalidDemandError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
