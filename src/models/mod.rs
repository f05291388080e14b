//! Roster planning domain models.
//!
//! Reference tables (operators, stations, products, training, time studies)
//! are inputs; demand and availability parameterize a run; proposals are
//! the output.
//!
//! # Domain Mappings
//!
//! | u-roster | Shop floor | Source table |
//! |----------|-----------|--------------|
//! | Operator | Worker / badge | training (operator columns) |
//! | Station | Work center (UT) | stations |
//! | Product | Project / module | products |
//! | TimeStudy | Standard time | times |
//! | Proposal | Weekly plan | planning output |

mod availability;
mod calendar;
mod demand;
mod product;
mod reference;
mod resource;
mod schedule;

pub use availability::AvailabilityMap;
pub use calendar::{business_days_in_month, iso_weeks_in_month, week_monday, WorkDay};
pub use demand::{DemandPeriod, DemandRow, WeeklyDemand};
pub use product::Product;
pub use reference::{ReferenceData, TimeStudy, TrainingEntry};
pub use resource::{Operator, Station, DEFAULT_DAILY_MINUTES};
pub use schedule::{Proposal, ProposalRow, ProposalSummary, ProductOutcome, ScheduleEntry};
