//! Proposal quality metrics (KPIs).
//!
//! Computes the indicators a planner compares proposals by.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill rate | scheduled units / requested units |
//! | Unscheduled | Sum of per-product remainders |
//! | Busy minutes | Sum of entry durations |
//! | Utilization | busy minutes / offered minutes, per operator |
//! | Last finish | Latest entry end on any day (minutes from shift start) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use crate::models::Proposal;

/// Proposal performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalKpi {
    pub requested_units: u64,
    pub scheduled_units: u64,
    pub unscheduled_units: u64,
    /// Fraction of requested units placed (0.0..1.0). 1.0 when nothing was requested.
    pub fill_rate: f64,
    pub entry_count: usize,
    /// Sum of entry durations over the week.
    pub busy_minutes: i64,
    /// Sum of operator horizons over the days they were available.
    pub offered_minutes: i64,
    /// Latest entry end of the week, measured within its own day.
    pub last_finish_minute: i64,
    /// Average utilization over operators with offered time (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-operator utilization.
    pub utilization_by_operator: BTreeMap<String, f64>,
}

impl ProposalKpi {
    /// Computes KPIs of a proposal.
    pub fn calculate(proposal: &Proposal) -> Self {
        let requested: u64 = proposal
            .summary
            .products
            .values()
            .map(|o| o.requested as u64)
            .sum();
        let scheduled = proposal.summary.total_scheduled();
        let unscheduled = proposal.summary.total_unscheduled();

        let mut busy_by_operator: BTreeMap<&str, i64> = BTreeMap::new();
        for e in &proposal.entries {
            let busy = busy_by_operator.entry(e.operator_id.as_str()).or_insert(0);
            *busy = busy.saturating_add(e.duration_minutes);
        }

        // Operators never offered time have no meaningful utilization
        let utilization_by_operator: BTreeMap<String, f64> = proposal
            .offered_minutes
            .iter()
            .filter(|&(_, &offered)| offered > 0)
            .map(|(id, &offered)| {
                let busy = busy_by_operator.get(id.as_str()).copied().unwrap_or(0);
                (id.clone(), busy as f64 / offered as f64)
            })
            .collect();

        let avg_utilization = if utilization_by_operator.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_operator.values().sum();
            sum / utilization_by_operator.len() as f64
        };

        let fill_rate = if requested == 0 {
            1.0
        } else {
            scheduled as f64 / requested as f64
        };

        Self {
            requested_units: requested,
            scheduled_units: scheduled,
            unscheduled_units: unscheduled,
            fill_rate,
            entry_count: proposal.entries.len(),
            busy_minutes: busy_by_operator
                .values()
                .fold(0i64, |acc, &m| acc.saturating_add(m)),
            offered_minutes: proposal
                .offered_minutes
                .values()
                .fold(0i64, |acc, &m| acc.saturating_add(m)),
            last_finish_minute: proposal
                .entries
                .iter()
                .map(|e| e.end_minute())
                .max()
                .unwrap_or(0),
            avg_utilization,
            utilization_by_operator,
        }
    }
}
