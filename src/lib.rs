//! Weekly operator roster planning for the U-Engine ecosystem.
//!
//! Assigns shop-floor operators to stations across a Monday–Friday week,
//! honoring training eligibility, daily availability, station capacity and
//! daily working-hour limits, and returns three alternative proposals for
//! human review. The engine is a greedy heuristic, not an exact optimizer.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Operator`, `Station`, `Product`,
//!   `ReferenceData`, `WeeklyDemand`, `AvailabilityMap`, `ScheduleEntry`,
//!   `Proposal`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown references, negative values)
//! - **`eligibility`**: Who may produce what, where, and how fast
//! - **`demand`**: Periodic demand → weekly required units
//! - **`dispatching`**: Product-ordering rules and strategies
//! - **`scheduler`**: Greedy assignment engine, proposal diversifier, KPIs
//! - **`planner`**: End-to-end weekly planning
//! - **`config`**: Planner configuration (TOML)
//!
//! # Data flow
//!
//! ```text
//! ReferenceData ─┬─> EligibilityResolver ─┐
//! DemandRow[] ───┴─> DemandTranslator ────┼─> AssignmentEngine ×3 ─> Proposal ×3
//! AvailabilityMap ────────────────────────┘      (ProposalDiversifier)
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

pub mod config;
pub mod demand;
pub mod dispatching;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod validation;

pub use config::PlannerConfig;
pub use error::PlanError;
pub use planner::WeeklyPlanner;
