//! Three distinct proposals from one engine.
//!
//! # Algorithm
//!
//! 1. Run the engine once per configured strategy (optionally on the rayon
//!    pool; runs share nothing mutable).
//! 2. Walk the results in proposal order. When a proposal places the same
//!    entries as an earlier one, re-run it with a seeded shuffle of the
//!    product order, trying successive seeds until it differs or the
//!    attempt budget runs out.
//!
//! Seeds derive from the base seed and the proposal index only, so
//! regenerating proposal *k* from identical input gives identical output.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use super::AssignmentEngine;
use crate::config::{DEFAULT_BASE_SEED, DEFAULT_PERTURBATION_ATTEMPTS};
use crate::dispatching::{OrderingStrategy, ProductOrdering};
use crate::models::{AvailabilityMap, Proposal, WeeklyDemand};

/// Number of proposals per run.
pub const PROPOSAL_COUNT: usize = 3;

const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Drives the assignment engine once per strategy.
#[derive(Debug, Clone, Copy)]
pub struct ProposalDiversifier<'a> {
    engine: AssignmentEngine<'a>,
    strategies: [OrderingStrategy; PROPOSAL_COUNT],
    base_seed: u64,
    max_attempts: u32,
    parallel: bool,
}

impl<'a> ProposalDiversifier<'a> {
    /// Creates a diversifier with the default strategies, seed root and
    /// perturbation budget.
    pub fn new(engine: AssignmentEngine<'a>) -> Self {
        Self {
            engine,
            strategies: [
                OrderingStrategy::DescendingDemand,
                OrderingStrategy::AscendingProductId,
                OrderingStrategy::DescendingStandardTime,
            ],
            base_seed: DEFAULT_BASE_SEED,
            max_attempts: DEFAULT_PERTURBATION_ATTEMPTS,
            parallel: false,
        }
    }

    /// Sets the strategy of each proposal.
    pub fn with_strategies(mut self, strategies: [OrderingStrategy; PROPOSAL_COUNT]) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the perturbation seed root and attempt budget.
    pub fn with_perturbation(mut self, base_seed: u64, max_attempts: u32) -> Self {
        self.base_seed = base_seed;
        self.max_attempts = max_attempts;
        self
    }

    /// Runs the strategy passes on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Seed of the `attempt`-th perturbation of proposal `index` (1-based).
    pub fn perturbation_seed(&self, index: usize, attempt: u32) -> u64 {
        (self.base_seed ^ (index as u64).wrapping_mul(SEED_SPREAD)).wrapping_add(attempt as u64)
    }

    /// Produces exactly three proposals, in strategy order.
    #[instrument(skip_all, fields(week = %week_of, parallel = self.parallel))]
    pub fn generate(
        &self,
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        week_of: NaiveDate,
    ) -> Vec<Proposal> {
        let run = |(i, strategy): (usize, &OrderingStrategy)| {
            let ordering = ProductOrdering::from_strategy(*strategy);
            self.engine.run(i + 1, &ordering, demand, availability, week_of)
        };
        let drafts: Vec<Proposal> = if self.parallel {
            self.strategies[..].par_iter().enumerate().map(run).collect()
        } else {
            self.strategies.iter().enumerate().map(run).collect()
        };

        let mut accepted: Vec<Proposal> = Vec::with_capacity(PROPOSAL_COUNT);
        for draft in drafts {
            let proposal = if Self::duplicates(&draft, &accepted) {
                self.perturb(draft, &accepted, demand, availability, week_of)
            } else {
                draft
            };
            accepted.push(proposal);
        }
        accepted
    }

    /// Re-runs a colliding proposal with seeded product orders.
    ///
    /// Keeps the unperturbed draft when no attempt yields a new plan.
    fn perturb(
        &self,
        draft: Proposal,
        accepted: &[Proposal],
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        week_of: NaiveDate,
    ) -> Proposal {
        let index = draft.index;
        let products: Vec<_> = self
            .engine
            .products()
            .iter()
            .filter(|p| demand.units(&p.id) > 0)
            .cloned()
            .collect();

        for attempt in 0..self.max_attempts {
            let seed = self.perturbation_seed(index, attempt);
            warn!(
                proposal = index,
                strategy = %draft.strategy,
                seed,
                "proposal collides, perturbing product order"
            );
            let ordering = ProductOrdering::perturbed(draft.strategy, seed, &products);
            let candidate = self
                .engine
                .run(index, &ordering, demand, availability, week_of);
            if !Self::duplicates(&candidate, accepted) {
                return candidate;
            }
            debug!(proposal = index, seed, "perturbed order still collides");
        }

        warn!(proposal = index, "no distinct plan found, keeping duplicate");
        draft
    }

    fn duplicates(candidate: &Proposal, accepted: &[Proposal]) -> bool {
        accepted.iter().any(|p| p.same_plan_as(candidate))
    }
}
