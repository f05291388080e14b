//! Product-ordering rules and strategies.
//!
//! Decides which product receives the next batch during a day's passes.
//! Rules score products; a rule engine composes them lexicographically; an
//! [`OrderingStrategy`] names one composition, and proposals differ by the
//! strategy they run with.
//!
//! # Usage
//!
//! ```
//! use u_roster::dispatching::{OrderingContext, OrderingStrategy, ProductOrdering};
//! use u_roster::models::Product;
//!
//! let products = vec![Product::new("P1"), Product::new("P2")];
//! let ctx = OrderingContext::new().with_remaining("P2", 9).with_remaining("P1", 4);
//! let ordering = ProductOrdering::from_strategy(OrderingStrategy::DescendingDemand);
//! assert_eq!(ordering.order(&products, &ctx), vec![1, 0]);
//! ```

mod context;
mod engine;
pub mod rules;
mod strategy;

pub use context::OrderingContext;
pub use engine::RuleEngine;
pub use strategy::{OrderingStrategy, ProductOrdering};

use crate::models::Product;
use std::fmt::Debug;

/// Score returned by an ordering rule.
///
/// Lower scores = higher priority (placed first).
pub type RuleScore = f64;

/// A rule that evaluates product priority.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait OrderingRule: Send + Sync + Debug {
    /// Rule name (e.g., "MOST_REMAINING").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a product given the current context.
    fn evaluate(&self, product: &Product, context: &OrderingContext) -> RuleScore;
}
