//! Per-day operator availability.
//!
//! Planner-supplied and independent of training: an operator can be present
//! on a day yet have nothing they are qualified to do.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{week_monday, WorkDay};

/// Operators that may be scheduled on each work day.
///
/// A day with no entry has nobody available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityMap {
    days: BTreeMap<WorkDay, BTreeSet<String>>,
}

impl AvailabilityMap {
    /// Creates an empty map (nobody available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the same operators available on every work day.
    pub fn all_week<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ops: BTreeSet<String> = operators.into_iter().map(Into::into).collect();
        Self {
            days: WorkDay::ALL.iter().map(|&d| (d, ops.clone())).collect(),
        }
    }

    /// Builds a map from dated entries, keeping only the dates that fall on
    /// a work day of the week containing `week_of`.
    pub fn from_dated<I, S>(week_of: NaiveDate, dated: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Vec<S>)>,
        S: Into<String>,
    {
        let monday = week_monday(week_of);
        let mut map = Self::new();
        for (date, ops) in dated {
            match WorkDay::of(date) {
                Some(day) if week_monday(date) == monday => {
                    map = map.with_day(day, ops);
                }
                _ => tracing::debug!(%date, "ignoring availability outside the planned week"),
            }
        }
        map
    }

    /// Adds operators to a day.
    pub fn with_day<I, S>(mut self, day: WorkDay, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.days
            .entry(day)
            .or_default()
            .extend(operators.into_iter().map(Into::into));
        self
    }

    /// Removes an operator from one day.
    pub fn without(mut self, day: WorkDay, operator_id: &str) -> Self {
        if let Some(ops) = self.days.get_mut(&day) {
            ops.remove(operator_id);
        }
        self
    }

    /// Whether the operator may be scheduled on the day.
    pub fn is_available(&self, day: WorkDay, operator_id: &str) -> bool {
        self.days
            .get(&day)
            .is_some_and(|ops| ops.contains(operator_id))
    }

    /// Operators available on the day, in identifier order.
    pub fn operators_on(&self, day: WorkDay) -> impl Iterator<Item = &str> {
        self.days
            .get(&day)
            .into_iter()
            .flat_map(|ops| ops.iter().map(String::as_str))
    }

    /// Every (day, operator) pair, for integrity checks.
    pub fn iter(&self) -> impl Iterator<Item = (WorkDay, &str)> {
        self.days
            .iter()
            .flat_map(|(&day, ops)| ops.iter().map(move |op| (day, op.as_str())))
    }

    /// Number of operator-days.
    pub fn len(&self) -> usize {
        self.days.values().map(BTreeSet::len).sum()
    }

    /// Whether nobody is available all week.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
