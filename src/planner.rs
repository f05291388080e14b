//! Weekly planning entry point.
//!
//! Wires the pipeline: validate reference data and availability, translate
//! demand, resolve eligibility, then diversify three proposals. Any
//! integrity or demand error aborts the whole run; no partial proposals
//! are returned.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::config::PlannerConfig;
use crate::demand::DemandTranslator;
use crate::eligibility::EligibilityResolver;
use crate::error::{DataIntegrityError, PlanError};
use crate::models::{week_monday, AvailabilityMap, DemandRow, Proposal, ReferenceData, WeeklyDemand};
use crate::scheduler::{AssignmentEngine, ProposalDiversifier};
use crate::validation::{validate_availability, validate_reference_data, ValidationResult};

/// Plans one work week from reference data, demand and availability.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::models::*;
/// use u_roster::planner::WeeklyPlanner;
///
/// let data = ReferenceData::new()
///     .with_operator(Operator::new("OP1"))
///     .with_operator(Operator::new("OP2"))
///     .with_station(Station::new("WC1"))
///     .with_product(Product::new("P1"))
///     .with_training(TrainingEntry::qualified("OP1", "WC1"))
///     .with_training(TrainingEntry::qualified("OP2", "WC1"))
///     .with_time_study(TimeStudy::new("WC1", "P1", 60));
/// let demand = vec![DemandRow::weekly("P1", 2025, 11, 10.0)];
/// let availability = AvailabilityMap::all_week(["OP1", "OP2"]);
/// let week = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
///
/// let proposals = WeeklyPlanner::default()
///     .plan(&data, &demand, &availability, week)
///     .unwrap();
/// assert_eq!(proposals.len(), 3);
/// assert!(proposals.iter().all(|p| p.unscheduled_units("P1") == 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeeklyPlanner {
    config: PlannerConfig,
}

impl WeeklyPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Creates a planner from a TOML configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self, PlanError> {
        Ok(Self::new(PlannerConfig::from_toml_str(source)?))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Translates periodic demand and plans the week containing `target`.
    ///
    /// # Errors
    /// - [`PlanError::Config`] for an out-of-range configuration.
    /// - [`PlanError::DataIntegrity`] for unknown references, duplicate
    ///   identifiers or negative values in the inputs.
    /// - [`PlanError::InvalidDemand`] for malformed demand rows.
    #[instrument(skip_all, fields(week = %week_monday(target)))]
    pub fn plan(
        &self,
        data: &ReferenceData,
        demand_rows: &[DemandRow],
        availability: &AvailabilityMap,
        target: NaiveDate,
    ) -> Result<Vec<Proposal>, PlanError> {
        self.check_inputs(data, availability)?;
        let demand = DemandTranslator::new(self.config.demand.clone()).translate(
            demand_rows,
            &data.products,
            target,
        )?;
        info!(
            products = demand.len(),
            units = demand.total_units(),
            "weekly demand translated"
        );
        Ok(self.diversify(data, &demand, availability, target))
    }

    /// Plans the week containing `target` from already-weekly demand.
    ///
    /// # Errors
    /// As [`plan`](Self::plan); a demand entry naming an unknown product
    /// is a [`PlanError::DataIntegrity`].
    #[instrument(skip_all, fields(week = %week_monday(target)))]
    pub fn plan_weekly(
        &self,
        data: &ReferenceData,
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        target: NaiveDate,
    ) -> Result<Vec<Proposal>, PlanError> {
        self.check_inputs(data, availability)?;
        if let Some((unknown, _)) = demand.iter().find(|(id, _)| data.product(id).is_none()) {
            return Err(DataIntegrityError::unknown("demand", "product_id", unknown).into());
        }
        Ok(self.diversify(data, demand, availability, target))
    }

    fn check_inputs(&self, data: &ReferenceData, availability: &AvailabilityMap) -> Result<(), PlanError> {
        self.config.validate()?;
        first_error(validate_reference_data(data))?;
        first_error(validate_availability(availability, data))?;
        Ok(())
    }

    fn diversify(
        &self,
        data: &ReferenceData,
        demand: &WeeklyDemand,
        availability: &AvailabilityMap,
        target: NaiveDate,
    ) -> Vec<Proposal> {
        let resolver = EligibilityResolver::from_validated(data);
        let engine = AssignmentEngine::new(data, &resolver, &self.config);
        ProposalDiversifier::new(engine)
            .with_strategies(self.config.strategies)
            .with_perturbation(self.config.base_seed, self.config.max_perturbation_attempts)
            .with_parallel(self.config.parallel)
            .generate(demand, availability, target)
    }
}

/// Logs every collected error and surfaces the first.
fn first_error(result: ValidationResult) -> Result<(), DataIntegrityError> {
    match result {
        Ok(()) => Ok(()),
        Err(mut errors) => {
            for e in &errors {
                warn!(error = %e, "input integrity error");
            }
            Err(errors.swap_remove(0))
        }
    }
}
