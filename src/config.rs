//! Planner configuration.
//!
//! Shift lengths, time granularity, demand distribution and ordering
//! strategies are explicit here and passed in per run. Nothing is
//! process-global.
//!
//! # Loading
//!
//! ```
//! use u_roster::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     time_step_minutes = 15
//!     base_seed = 7
//!
//!     [calendar]
//!     shift_start = "06:30:00"
//!
//!     [calendar.shift_caps]
//!     friday = 360
//! "#).unwrap();
//! assert_eq!(config.time_step_minutes, 15);
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::dispatching::OrderingStrategy;
use crate::error::ConfigError;
use crate::models::WorkDay;

/// How monthly demand is spread over weeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionPolicy {
    /// Week's share of the month's business days (ceil per contribution).
    #[default]
    BusinessDayShare,
    /// Equal split (ceil) over the ISO weeks the month's business days touch.
    EvenIsoWeeks,
}

/// Demand translation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandPolicy {
    pub distribution: DistributionPolicy,
    /// Scales every quantity before rounding. Must be finite and ≥ 0.
    pub multiplier: f64,
}

impl Default for DemandPolicy {
    fn default() -> Self {
        Self {
            distribution: DistributionPolicy::BusinessDayShare,
            multiplier: 1.0,
        }
    }
}

/// Order in which (station, operator) pairs are tried for a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairSelection {
    /// Least minutes already worked today, then lowest station index.
    #[default]
    LeastLoaded,
    /// Lowest station index, then operator reference order.
    FirstFit,
}

/// Per-day shift length caps (minutes). `None` leaves the day uncapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftCaps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<i64>,
}

impl ShiftCaps {
    /// Cap of one day.
    pub fn get(&self, day: WorkDay) -> Option<i64> {
        match day {
            WorkDay::Monday => self.monday,
            WorkDay::Tuesday => self.tuesday,
            WorkDay::Wednesday => self.wednesday,
            WorkDay::Thursday => self.thursday,
            WorkDay::Friday => self.friday,
        }
    }

    fn slot(&mut self, day: WorkDay) -> &mut Option<i64> {
        match day {
            WorkDay::Monday => &mut self.monday,
            WorkDay::Tuesday => &mut self.tuesday,
            WorkDay::Wednesday => &mut self.wednesday,
            WorkDay::Thursday => &mut self.thursday,
            WorkDay::Friday => &mut self.friday,
        }
    }
}

/// Shift structure of the work week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCalendar {
    /// Clock time that minute 0 of every day maps to.
    pub shift_start: NaiveTime,
    /// Days without a cap use each operator's own daily capacity.
    pub shift_caps: ShiftCaps,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            shift_caps: ShiftCaps::default(),
        }
    }
}

impl WorkCalendar {
    /// Eight-hour days Monday–Thursday, six hours on Friday.
    pub fn standard_week() -> Self {
        Self::default()
            .with_cap(WorkDay::Monday, 480)
            .with_cap(WorkDay::Tuesday, 480)
            .with_cap(WorkDay::Wednesday, 480)
            .with_cap(WorkDay::Thursday, 480)
            .with_cap(WorkDay::Friday, 360)
    }

    /// Sets the shift start clock time.
    pub fn with_shift_start(mut self, start: NaiveTime) -> Self {
        self.shift_start = start;
        self
    }

    /// Caps the shift length of one day.
    pub fn with_cap(mut self, day: WorkDay, minutes: i64) -> Self {
        *self.shift_caps.slot(day) = Some(minutes);
        self
    }

    /// Working minutes available to an operator with `daily_minutes` capacity.
    pub fn horizon(&self, day: WorkDay, daily_minutes: i64) -> i64 {
        let cap = self.shift_caps.get(day).unwrap_or(i64::MAX);
        daily_minutes.min(cap).max(0)
    }
}

/// Default root of the per-proposal perturbation seeds.
pub const DEFAULT_BASE_SEED: u64 = 0x5EED_2025;

/// Default number of seeded re-runs per colliding proposal.
pub const DEFAULT_PERTURBATION_ATTEMPTS: u32 = 8;

/// Full planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// One product-ordering strategy per proposal.
    pub strategies: [OrderingStrategy; 3],
    /// Root of the per-proposal perturbation seed.
    pub base_seed: u64,
    /// Seeded re-runs tried when a proposal duplicates an earlier one.
    pub max_perturbation_attempts: u32,
    pub pair_selection: PairSelection,
    /// Batch durations are rounded up to a multiple of this (minutes).
    pub time_step_minutes: i64,
    pub calendar: WorkCalendar,
    pub demand: DemandPolicy,
    /// Run the engine passes on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategies: [
                OrderingStrategy::DescendingDemand,
                OrderingStrategy::AscendingProductId,
                OrderingStrategy::DescendingStandardTime,
            ],
            base_seed: DEFAULT_BASE_SEED,
            max_perturbation_attempts: DEFAULT_PERTURBATION_ATTEMPTS,
            pair_selection: PairSelection::LeastLoaded,
            time_step_minutes: 1,
            calendar: WorkCalendar::default(),
            demand: DemandPolicy::default(),
            parallel: false,
        }
    }
}

impl PlannerConfig {
    /// Parses and validates a TOML document. Missing fields take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_step_minutes < 1 {
            return Err(ConfigError::Invalid {
                field: "time_step_minutes",
                reason: format!("must be at least 1, got {}", self.time_step_minutes),
            });
        }
        for day in WorkDay::ALL {
            if let Some(minutes) = self.calendar.shift_caps.get(day).filter(|&m| m < 0) {
                return Err(ConfigError::Invalid {
                    field: "calendar.shift_caps",
                    reason: format!("{day} cap is negative: {minutes}"),
                });
            }
        }
        Ok(())
    }

    /// Sets the strategies.
    pub fn with_strategies(mut self, strategies: [OrderingStrategy; 3]) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the perturbation seed root.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets the pair selection heuristic.
    pub fn with_pair_selection(mut self, selection: PairSelection) -> Self {
        self.pair_selection = selection;
        self
    }

    /// Sets the time granularity.
    pub fn with_time_step(mut self, minutes: i64) -> Self {
        self.time_step_minutes = minutes;
        self
    }

    /// Sets the work calendar.
    pub fn with_calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the demand policy.
    pub fn with_demand_policy(mut self, demand: DemandPolicy) -> Self {
        self.demand = demand;
        self
    }

    /// Enables parallel proposal generation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
