//! Greedy assignment engine, proposal diversification and KPIs.
//!
//! # Algorithm
//!
//! `AssignmentEngine` is a greedy, priority-ordered bin-packing heuristic
//! over (day, station, operator) slots. It is not optimal, but it is fast,
//! deterministic and always feasible.
//!
//! `ProposalDiversifier` runs the engine once per ordering strategy and
//! perturbs the product order of any run that repeats an earlier plan.
//!
//! # KPI
//!
//! `ProposalKpi` computes fill rate, unscheduled remainder, busy minutes
//! and operator utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod diversifier;
mod engine;
mod kpi;
mod timeline;

pub use diversifier::{ProposalDiversifier, PROPOSAL_COUNT};
pub use engine::AssignmentEngine;
pub use kpi::ProposalKpi;
