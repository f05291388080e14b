//! Greedy weekly assignment engine.
//!
//! # Algorithm
//!
//! Days run Monday → Friday. Each day:
//!
//! 1. Reset every available operator to an empty timeline whose horizon is
//!    `min(daily capacity, calendar cap)`; reset every station.
//! 2. Rank products with open demand by the run's ordering.
//! 3. For each product in rank order, try its eligible (station, operator)
//!    pairs in pair-selection order (seeded order for perturbed runs). The
//!    first pair with a window that fits at least one whole unit receives
//!    the largest batch that fits.
//! 4. Repeat 2–3 (one batch per product per pass) until a pass places
//!    nothing, then move to the next day.
//!
//! Demand that finds no slot is left as unscheduled remainder; the engine
//! itself never fails.
//!
//! # Complexity
//! O(d · p · b · s · o) where d=days, p=products, b=batches per product,
//! s=stations, o=operators.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use super::timeline::{batch_minutes, round_up, units_that_fit, OperatorDay, StationDay};
use crate::config::{PairSelection, PlannerConfig};
use crate::dispatching::{OrderingContext, ProductOrdering};
use crate::eligibility::EligibilityResolver;
use crate::models::{
    week_monday, AvailabilityMap, Product, Proposal, ProposalSummary, ReferenceData,
    ScheduleEntry, WeeklyDemand, WorkDay,
};

/// Runs one greedy pass over the week for a given product ordering.
///
/// Holds only shared, read-only inputs; every [`run`](Self::run) builds
/// its own timelines, so one engine may serve several threads.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::config::PlannerConfig;
/// use u_roster::dispatching::{OrderingStrategy, ProductOrdering};
/// use u_roster::eligibility::EligibilityResolver;
/// use u_roster::models::*;
/// use u_roster::scheduler::AssignmentEngine;
///
/// let data = ReferenceData::new()
///     .with_operator(Operator::new("OP1"))
///     .with_station(Station::new("WC1"))
///     .with_product(Product::new("P1"))
///     .with_training(TrainingEntry::qualified("OP1", "WC1"))
///     .with_time_study(TimeStudy::new("WC1", "P1", 60));
/// let resolver = EligibilityResolver::new(&data).unwrap();
/// let config = PlannerConfig::default();
/// let engine = AssignmentEngine::new(&data, &resolver, &config);
///
/// let demand = WeeklyDemand::new().with("P1", 4);
/// let availability = AvailabilityMap::all_week(["OP1"]);
/// let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let ordering = ProductOrdering::from_strategy(OrderingStrategy::DescendingDemand);
///
/// let proposal = engine.run(1, &ordering, &demand, &availability, monday);
/// assert_eq!(proposal.scheduled_units("P1"), 4);
/// assert_eq!(proposal.entry_count(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine<'a> {
    data: &'a ReferenceData,
    resolver: &'a EligibilityResolver,
    config: &'a PlannerConfig,
}

/// An available operator's state for the current day.
struct Slot<'d> {
    id: &'d str,
    position: usize,
    timeline: OperatorDay,
}

/// A pair worth trying for the current product.
struct Candidate {
    load: i64,
    station: usize,
    slot: usize,
    position: usize,
}

impl<'a> AssignmentEngine<'a> {
    /// Creates an engine over validated reference data.
    pub fn new(
        data: &'a ReferenceData,
        resolver: &'a EligibilityResolver,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            data,
            resolver,
            config,
        }
    }

    /// Products of the reference data, in reference order.
    pub fn products(&self) -> &'a [Product] {
        &self.data.products
    }

    /// Builds one proposal for the week containing `week_of`.
    ///
    /// Demand for products missing from the reference data is reported as
    /// unscheduled and never placed.
    #[instrument(skip_all, fields(proposal = index, strategy = %ordering.strategy()))]
    pub fn run(
        &self,
        index: usize,
        ordering: &ProductOrdering,
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        week_of: NaiveDate,
    ) -> Proposal {
        let week_start = week_monday(week_of);
        let products: Vec<Product> = self
            .data
            .products
            .iter()
            .filter(|p| demand.units(&p.id) > 0)
            .cloned()
            .collect();
        let mut remaining: HashMap<String, u32> = products
            .iter()
            .map(|p| (p.id.clone(), demand.units(&p.id)))
            .collect();
        let longest: HashMap<String, i64> = products
            .iter()
            .filter_map(|p| {
                self.resolver
                    .longest_standard_time(&p.id)
                    .map(|m| (p.id.clone(), m))
            })
            .collect();

        let mut entries = Vec::new();
        for day in WorkDay::ALL {
            self.plan_day(
                day,
                week_start,
                ordering,
                availability,
                &products,
                &longest,
                &mut remaining,
                &mut entries,
            );
        }

        entries.sort_by(|a, b| {
            (a.day, &a.operator_id, a.start_minute, &a.station_id, &a.product_id).cmp(&(
                b.day,
                &b.operator_id,
                b.start_minute,
                &b.station_id,
                &b.product_id,
            ))
        });

        let summary = ProposalSummary::build(&entries, demand, &self.data.products);
        for (product_id, outcome) in &summary.products {
            if outcome.unscheduled > 0 {
                warn!(
                    product = %product_id,
                    requested = outcome.requested,
                    unscheduled = outcome.unscheduled,
                    "demand left unscheduled"
                );
            }
        }
        info!(
            entries = entries.len(),
            scheduled = summary.total_scheduled(),
            unscheduled = summary.total_unscheduled(),
            "proposal built"
        );

        Proposal {
            index,
            strategy: ordering.strategy(),
            perturbation_seed: ordering.perturbation_seed(),
            week_start,
            shift_start: self.config.calendar.shift_start,
            entries,
            summary,
            offered_minutes: self.offered_minutes(availability),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_day(
        &self,
        day: WorkDay,
        week_start: NaiveDate,
        ordering: &ProductOrdering,
        availability: &AvailabilityMap,
        products: &[Product],
        longest: &HashMap<String, i64>,
        remaining: &mut HashMap<String, u32>,
        entries: &mut Vec<ScheduleEntry>,
    ) {
        let mut slots: Vec<Slot<'_>> = self
            .data
            .operators
            .iter()
            .enumerate()
            .filter(|(_, op)| availability.is_available(day, &op.id))
            .map(|(position, op)| Slot {
                id: op.id.as_str(),
                position,
                timeline: OperatorDay::new(self.config.calendar.horizon(day, op.daily_minutes)),
            })
            .filter(|slot| slot.timeline.has_room())
            .collect();
        let mut stations: Vec<StationDay> = self
            .data
            .stations
            .iter()
            .map(|s| StationDay::new(s.capacity.max(0) as usize))
            .collect();

        if slots.is_empty() {
            debug!(%day, "no operator available");
            return;
        }

        let date = day.date_in_week(week_start);
        let mut pass = 0;
        loop {
            pass += 1;
            let context = ordering.decorate(Self::context(products, remaining, longest));
            let mut placed = 0;

            for idx in ordering.order(products, &context) {
                let product = &products[idx];
                let open = remaining.get(&product.id).copied().unwrap_or(0);
                if open == 0 {
                    continue;
                }
                let Some(entry) = self.place_batch(
                    ordering,
                    product,
                    open,
                    day,
                    date,
                    &mut slots,
                    &mut stations,
                ) else {
                    continue;
                };
                if let Some(left) = remaining.get_mut(&product.id) {
                    *left -= entry.units;
                }
                entries.push(entry);
                placed += 1;
            }

            debug!(%day, pass, placed, "pass complete");
            if placed == 0 {
                break;
            }
        }
    }

    /// Places the largest feasible batch of `product` on the best pair.
    ///
    /// A perturbed ordering's seeded pair keys take precedence over the
    /// configured pair selection.
    #[allow(clippy::too_many_arguments)]
    fn place_batch(
        &self,
        ordering: &ProductOrdering,
        product: &Product,
        open: u32,
        day: WorkDay,
        date: NaiveDate,
        slots: &mut [Slot<'_>],
        stations: &mut [StationDay],
    ) -> Option<ScheduleEntry> {
        let step = self.config.time_step_minutes;
        let mut candidates: Vec<Candidate> = Vec::new();
        for (si, station) in self.data.stations.iter().enumerate() {
            for (oi, slot) in slots.iter().enumerate() {
                if slot.timeline.has_room()
                    && self.resolver.can_produce(slot.id, &station.id, &product.id)
                {
                    candidates.push(Candidate {
                        load: slot.timeline.busy(),
                        station: si,
                        slot: oi,
                        position: slot.position,
                    });
                }
            }
        }

        match self.config.pair_selection {
            PairSelection::LeastLoaded => {
                candidates.sort_by_key(|c| (c.load, c.station, c.position));
            }
            PairSelection::FirstFit => candidates.sort_by_key(|c| (c.station, c.position)),
        }
        if ordering.perturbation_seed().is_some() {
            candidates.sort_by_cached_key(|c| ordering.pair_key(day, c.station, c.position));
        }

        for c in candidates {
            let station = &self.data.stations[c.station];
            let Some(minutes_per_unit) = self.resolver.standard_time(&station.id, &product.id)
            else {
                continue;
            };
            let slot = &mut slots[c.slot];
            let Some(one_unit) = round_up(minutes_per_unit, step) else {
                continue;
            };
            let Some((start, limit)) = stations[c.station].earliest_window(
                slot.timeline.cursor(),
                slot.timeline.horizon(),
                one_unit,
            ) else {
                continue;
            };

            let units = units_that_fit(limit - start, minutes_per_unit, step, open);
            if units == 0 {
                continue;
            }
            let Some(duration) = batch_minutes(units, minutes_per_unit, step) else {
                continue;
            };
            slot.timeline.book(start, duration);
            stations[c.station].book(start, start + duration);

            debug!(
                %day,
                product = %product.id,
                station = %station.id,
                operator = %slot.id,
                start,
                duration,
                units,
                "batch placed"
            );
            return Some(ScheduleEntry {
                day,
                date,
                station_id: station.id.clone(),
                operator_id: slot.id.to_string(),
                product_id: product.id.clone(),
                start_minute: start,
                duration_minutes: duration,
                units,
            });
        }
        None
    }

    fn context(
        products: &[Product],
        remaining: &HashMap<String, u32>,
        longest: &HashMap<String, i64>,
    ) -> OrderingContext {
        let mut context = OrderingContext::new();
        for p in products {
            context
                .remaining_units
                .insert(p.id.clone(), remaining.get(&p.id).copied().unwrap_or(0));
            if let Some(&minutes) = longest.get(&p.id) {
                context.longest_standard_time.insert(p.id.clone(), minutes);
            }
        }
        context
    }

    /// Operator → minutes offered over the week.
    fn offered_minutes(&self, availability: &AvailabilityMap) -> BTreeMap<String, i64> {
        self.data
            .operators
            .iter()
            .map(|op| {
                let minutes = WorkDay::ALL
                    .iter()
                    .filter(|&&day| availability.is_available(day, &op.id))
                    .map(|&day| self.config.calendar.horizon(day, op.daily_minutes))
                    .fold(0i64, i64::saturating_add);
                (op.id.clone(), minutes)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkCalendar;
    use crate::dispatching::OrderingStrategy;
    use crate::models::{Operator, Station, TimeStudy, TrainingEntry};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn one_station_two_operators() -> ReferenceData {
        ReferenceData::new()
            .with_operator(Operator::new("OP1"))
            .with_operator(Operator::new("OP2"))
            .with_station(Station::new("WC1"))
            .with_product(Product::new("P1"))
            .with_training(TrainingEntry::qualified("OP1", "WC1"))
            .with_training(TrainingEntry::qualified("OP2", "WC1"))
            .with_time_study(TimeStudy::new("WC1", "P1", 60))
    }

    fn run(
        data: &ReferenceData,
        config: &PlannerConfig,
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        strategy: OrderingStrategy,
    ) -> Proposal {
        let resolver = EligibilityResolver::new(data).unwrap();
        let engine = AssignmentEngine::new(data, &resolver, config);
        engine.run(
            1,
            &ProductOrdering::from_strategy(strategy),
            demand,
            availability,
            monday(),
        )
    }

    #[test]
    fn test_single_station_fills_monday() {
        let data = one_station_two_operators();
        let demand = WeeklyDemand::new().with("P1", 10);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );

        assert_eq!(p.scheduled_units("P1"), 10);
        assert_eq!(p.unscheduled_units("P1"), 0);
        // Station capacity 1: OP2 could only start at 480, the end of its day
        let monday_units: u32 = p.entries_on(WorkDay::Monday).iter().map(|e| e.units).sum();
        assert_eq!(monday_units, 8);
        let tuesday_units: u32 = p.entries_on(WorkDay::Tuesday).iter().map(|e| e.units).sum();
        assert_eq!(tuesday_units, 2);
    }

    #[test]
    fn test_station_concurrency_respected() {
        let data = one_station_two_operators().with_station(Station::new("WC2"));
        let demand = WeeklyDemand::new().with("P1", 40);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );

        for a in &p.entries {
            for b in &p.entries {
                if !std::ptr::eq(a, b) && a.station_id == b.station_id {
                    assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                }
            }
        }
        // 1 station × 5 days × 8 units
        assert_eq!(p.scheduled_units("P1"), 40);
    }

    #[test]
    fn test_capacity_two_runs_in_parallel() {
        let data = ReferenceData::new()
            .with_operator(Operator::new("OP1"))
            .with_operator(Operator::new("OP2"))
            .with_station(Station::new("WC1").with_capacity(2))
            .with_product(Product::new("P1"))
            .with_training(TrainingEntry::qualified("OP1", "WC1"))
            .with_training(TrainingEntry::qualified("OP2", "WC1"))
            .with_time_study(TimeStudy::new("WC1", "P1", 60));
        let demand = WeeklyDemand::new().with("P1", 16);
        let availability = AvailabilityMap::new().with_day(WorkDay::Monday, ["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );

        assert_eq!(p.entry_count(), 2);
        assert!(p.entries.iter().all(|e| e.start_minute == 0 && e.units == 8));
    }

    #[test]
    fn test_operator_capacity_and_no_overlap() {
        let data = one_station_two_operators()
            .with_station(Station::new("WC2"))
            .with_product(Product::new("P2"))
            .with_training(TrainingEntry::qualified("OP1", "WC2"))
            .with_time_study(TimeStudy::new("WC2", "P2", 45))
            .with_time_study(TimeStudy::new("WC2", "P1", 50));
        let demand = WeeklyDemand::new().with("P1", 30).with("P2", 30);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingStandardTime,
        );

        for op in ["OP1", "OP2"] {
            for day in WorkDay::ALL {
                assert!(p.busy_minutes(op, day) <= 480);
                let mine: Vec<_> = p
                    .entries
                    .iter()
                    .filter(|e| e.operator_id == op && e.day == day)
                    .collect();
                for w in mine.windows(2) {
                    assert!(w[0].end_minute() <= w[1].start_minute);
                }
            }
        }
        // OP2 is not trained on WC2
        assert!(p
            .entries
            .iter()
            .all(|e| !(e.operator_id == "OP2" && e.station_id == "WC2")));
    }

    #[test]
    fn test_calendar_cap_and_time_step() {
        let data = one_station_two_operators();
        let config = PlannerConfig::default()
            .with_calendar(WorkCalendar::standard_week())
            .with_time_step(15);
        let data = ReferenceData {
            time_studies: vec![TimeStudy::new("WC1", "P1", 50)],
            ..data
        };
        let demand = WeeklyDemand::new().with("P1", 100);
        let availability = AvailabilityMap::new().with_day(WorkDay::Friday, ["OP1"]);
        let p = run(&data, &config, &demand, &availability, OrderingStrategy::DescendingDemand);

        // Friday cap 360: 7 × 50 = 350 → rounds to 360
        assert_eq!(p.entry_count(), 1);
        assert_eq!(p.entries[0].units, 7);
        assert_eq!(p.entries[0].duration_minutes, 360);
        assert_eq!(p.offered_minutes["OP1"], 360);
        assert_eq!(p.offered_minutes["OP2"], 0);
        assert_eq!(p.unscheduled_units("P1"), 93);
    }

    #[test]
    fn test_missing_time_study_is_unplaceable() {
        let data = one_station_two_operators().with_product(Product::new("P9"));
        let demand = WeeklyDemand::new().with("P9", 100);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::AscendingProductId,
        );
        assert_eq!(p.entry_count(), 0);
        assert_eq!(p.unscheduled_units("P9"), 100);
    }

    #[test]
    fn test_unavailable_operator_gets_nothing() {
        let data = one_station_two_operators();
        let demand = WeeklyDemand::new().with("P1", 50);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]).without(WorkDay::Monday, "OP1");
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );
        assert!(p
            .entries_on(WorkDay::Monday)
            .iter()
            .all(|e| e.operator_id == "OP2"));
    }

    #[test]
    fn test_entries_sorted() {
        let data = one_station_two_operators().with_station(Station::new("WC2"));
        let demand = WeeklyDemand::new().with("P1", 70);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );
        for w in p.entries.windows(2) {
            let a = (w[0].day, &w[0].operator_id, w[0].start_minute);
            let b = (w[1].day, &w[1].operator_id, w[1].start_minute);
            assert!(a <= b);
        }
    }

    #[test]
    fn test_first_fit_prefers_first_station() {
        let data = one_station_two_operators()
            .with_station(Station::new("WC2"))
            .with_training(TrainingEntry::qualified("OP1", "WC2"))
            .with_time_study(TimeStudy::new("WC2", "P1", 60));
        let demand = WeeklyDemand::new().with("P1", 4);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let config = PlannerConfig::default().with_pair_selection(PairSelection::FirstFit);
        let p = run(&data, &config, &demand, &availability, OrderingStrategy::DescendingDemand);
        assert_eq!(p.entry_count(), 1);
        assert_eq!(p.entries[0].station_id, "WC1");
        assert_eq!(p.entries[0].operator_id, "OP1");
    }

    #[test]
    fn test_perturbed_runs_vary_operator_choice() {
        let data = one_station_two_operators();
        let resolver = EligibilityResolver::new(&data).unwrap();
        let config = PlannerConfig::default();
        let engine = AssignmentEngine::new(&data, &resolver, &config);
        let demand = WeeklyDemand::new().with("P1", 10);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);

        let monday_operator = |seed: u64| {
            let ordering = ProductOrdering::perturbed(
                OrderingStrategy::DescendingDemand,
                seed,
                engine.products(),
            );
            let p = engine.run(1, &ordering, &demand, &availability, monday());
            assert_eq!(p.scheduled_units("P1"), 10);
            assert_eq!(p.perturbation_seed, Some(seed));
            p.entries_on(WorkDay::Monday)[0].operator_id.clone()
        };

        assert_eq!(monday_operator(5), monday_operator(5));
        let chosen: std::collections::BTreeSet<String> = (0..16).map(monday_operator).collect();
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn test_huge_standard_time_never_fits() {
        let data = ReferenceData {
            time_studies: vec![TimeStudy::new("WC1", "P1", i64::MAX)],
            ..one_station_two_operators()
        };
        let config = PlannerConfig::default().with_time_step(15);
        let demand = WeeklyDemand::new().with("P1", 3);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(&data, &config, &demand, &availability, OrderingStrategy::DescendingStandardTime);
        assert_eq!(p.entry_count(), 0);
        assert_eq!(p.unscheduled_units("P1"), 3);
    }

    #[test]
    fn test_zero_demand_yields_no_entries() {
        let data = one_station_two_operators();
        let demand = WeeklyDemand::new().with("P1", 0);
        let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
        let p = run(
            &data,
            &PlannerConfig::default(),
            &demand,
            &availability,
            OrderingStrategy::DescendingDemand,
        );
        assert_eq!(p.entry_count(), 0);
        assert_eq!(p.unscheduled_units("P1"), 0);
    }
}
