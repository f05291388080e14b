//! Proposal (solution) model.
//!
//! A proposal is one complete candidate weekly roster: an ordered list of
//! schedule entries plus a per-product summary that reports what was asked
//! for, what was placed, and what was left over.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Product, WeeklyDemand, WorkDay};
use crate::dispatching::OrderingStrategy;

/// One operator working one batch of a product at one station.
///
/// Times are minutes from the start of the day's shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: WorkDay,
    pub date: NaiveDate,
    pub station_id: String,
    pub operator_id: String,
    pub product_id: String,
    /// Start offset from shift start (minutes).
    pub start_minute: i64,
    /// Length of the batch (minutes).
    pub duration_minutes: i64,
    /// Whole units produced by the batch.
    pub units: u32,
}

impl ScheduleEntry {
    /// End offset from shift start (exclusive).
    #[inline]
    pub fn end_minute(&self) -> i64 {
        self.start_minute + self.duration_minutes
    }

    /// Whether two entries share any instant on the same day.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day
            && self.start_minute < other.end_minute()
            && other.start_minute < self.end_minute()
    }

    /// Wall-clock start given the shift start time.
    pub fn start_at(&self, shift_start: NaiveTime) -> NaiveDateTime {
        self.date.and_time(shift_start) + Duration::minutes(self.start_minute)
    }

    /// Wall-clock end given the shift start time.
    pub fn end_at(&self, shift_start: NaiveTime) -> NaiveDateTime {
        self.date.and_time(shift_start) + Duration::minutes(self.end_minute())
    }
}

/// Requested vs. scheduled units of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOutcome {
    pub subsystem: String,
    pub requested: u32,
    pub scheduled: u32,
    /// `requested - scheduled`; demand the heuristic could not place.
    pub unscheduled: u32,
}

/// Derived summary of a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    /// Subsystem tag → units scheduled this week.
    pub by_subsystem: BTreeMap<String, u32>,
    /// Product → requested / scheduled / unscheduled.
    pub products: BTreeMap<String, ProductOutcome>,
}

impl ProposalSummary {
    /// Builds the summary from entries and the demand they were planned for.
    ///
    /// Every product with demand appears, even when nothing was placed.
    pub fn build(entries: &[ScheduleEntry], demand: &WeeklyDemand, products: &[Product]) -> Self {
        let subsystem_of = |id: &str| {
            products
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.subsystem.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let mut scheduled: BTreeMap<&str, u32> = BTreeMap::new();
        for e in entries {
            let placed = scheduled.entry(e.product_id.as_str()).or_insert(0);
            *placed = placed.saturating_add(e.units);
        }

        let mut summary = Self::default();
        for (product_id, requested) in demand.iter() {
            let placed = scheduled.get(product_id).copied().unwrap_or(0);
            let subsystem = subsystem_of(product_id);
            let total = summary.by_subsystem.entry(subsystem.clone()).or_insert(0);
            *total = total.saturating_add(placed);
            summary.products.insert(
                product_id.to_string(),
                ProductOutcome {
                    subsystem,
                    requested,
                    scheduled: placed,
                    unscheduled: requested.saturating_sub(placed),
                },
            );
        }
        summary
    }

    /// Total units left unplaced across all products.
    pub fn total_unscheduled(&self) -> u64 {
        self.products.values().map(|o| o.unscheduled as u64).sum()
    }

    /// Total units placed across all products.
    pub fn total_scheduled(&self) -> u64 {
        self.products.values().map(|o| o.scheduled as u64).sum()
    }
}

/// Flattened row shape consumed by exporters and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRow {
    pub proposal: usize,
    pub day: WorkDay,
    pub date: NaiveDate,
    pub station: String,
    pub operator: String,
    pub product: String,
    pub subsystem: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub units: u32,
}

/// One candidate weekly roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// 1-based position among the run's proposals.
    pub index: usize,
    /// Product ordering the engine ran with.
    pub strategy: OrderingStrategy,
    /// Seed of the perturbed product order, when the strategy's own order
    /// reproduced an earlier proposal.
    pub perturbation_seed: Option<u64>,
    /// Monday of the planned week.
    pub week_start: NaiveDate,
    /// Clock time that minute 0 of each day maps to.
    pub shift_start: NaiveTime,
    /// Entries sorted by (day, operator, start).
    pub entries: Vec<ScheduleEntry>,
    pub summary: ProposalSummary,
    /// Operator → minutes offered over the week (sum of daily horizons).
    pub offered_minutes: BTreeMap<String, i64>,
}

impl Proposal {
    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries of one operator, in time order.
    pub fn entries_for_operator(&self, operator_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.operator_id == operator_id)
            .collect()
    }

    /// Entries at one station.
    pub fn entries_for_station(&self, station_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.station_id == station_id)
            .collect()
    }

    /// Entries on one day.
    pub fn entries_on(&self, day: WorkDay) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.day == day).collect()
    }

    /// Units of a product placed this week.
    pub fn scheduled_units(&self, product_id: &str) -> u32 {
        self.summary
            .products
            .get(product_id)
            .map(|o| o.scheduled)
            .unwrap_or(0)
    }

    /// Units of a product left unplaced.
    pub fn unscheduled_units(&self, product_id: &str) -> u32 {
        self.summary
            .products
            .get(product_id)
            .map(|o| o.unscheduled)
            .unwrap_or(0)
    }

    /// Minutes an operator works on a day.
    pub fn busy_minutes(&self, operator_id: &str, day: WorkDay) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.operator_id == operator_id && e.day == day)
            .map(|e| e.duration_minutes)
            .sum()
    }

    /// Whether two proposals place the same work in the same order.
    pub fn same_plan_as(&self, other: &Self) -> bool {
        self.entries == other.entries
    }

    /// Flattens the proposal into one row per entry.
    pub fn rows(&self) -> Vec<ProposalRow> {
        self.entries
            .iter()
            .map(|e| ProposalRow {
                proposal: self.index,
                day: e.day,
                date: e.date,
                station: e.station_id.clone(),
                operator: e.operator_id.clone(),
                product: e.product_id.clone(),
                subsystem: self
                    .summary
                    .products
                    .get(&e.product_id)
                    .map(|o| o.subsystem.clone())
                    .unwrap_or_default(),
                start: e.start_at(self.shift_start),
                end: e.end_at(self.shift_start),
                duration_minutes: e.duration_minutes,
                units: e.units,
            })
            .collect()
    }
}
