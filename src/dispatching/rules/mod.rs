//! Built-in product-ordering rules.
//!
//! # Categories
//!
//! - **Demand-based**: MOST_REMAINING
//! - **Time-based**: LONGEST_STD
//! - **Perturbation**: SHUFFLE
//!
//! # Score Convention
//! All rules return lower scores for products that should be placed first.

use super::{OrderingContext, OrderingRule, RuleScore};
use crate::models::Product;

// ======================== Demand-based rules ========================

/// Most Remaining Demand.
///
/// Places the product with the most open units first, so large orders are
/// not starved by a stream of small ones.
#[derive(Debug, Clone, Copy)]
pub struct MostRemaining;

impl OrderingRule for MostRemaining {
    fn name(&self) -> &'static str {
        "MOST_REMAINING"
    }

    fn evaluate(&self, product: &Product, context: &OrderingContext) -> RuleScore {
        -(remaining(product, context) as f64)
    }
}

// ======================== Time-based rules ========================

/// Longest Standard Time.
///
/// Favors harder, longer jobs while operators still have full days.
/// Products with no producible station sort last.
#[derive(Debug, Clone, Copy)]
pub struct LongestStandardTime;

impl OrderingRule for LongestStandardTime {
    fn name(&self) -> &'static str {
        "LONGEST_STD"
    }

    fn evaluate(&self, product: &Product, context: &OrderingContext) -> RuleScore {
        match context.longest_standard_time.get(&product.id) {
            Some(&minutes) => -(minutes as f64),
            None => f64::MAX,
        }
    }
}

// ======================== Perturbation ========================

/// Seeded Shuffle.
///
/// Orders products by the pseudorandom keys in `context.shuffle_keys`.
/// Products without a key sort last.
#[derive(Debug, Clone, Copy)]
pub struct SeededShuffle;

impl OrderingRule for SeededShuffle {
    fn name(&self) -> &'static str {
        "SHUFFLE"
    }

    fn evaluate(&self, product: &Product, context: &OrderingContext) -> RuleScore {
        context
            .shuffle_keys
            .get(&product.id)
            .map(|&k| k as f64)
            .unwrap_or(f64::MAX)
    }
}

fn remaining(product: &Product, context: &OrderingContext) -> u32 {
    context
        .remaining_units
        .get(&product.id)
        .copied()
        .unwrap_or(0)
}
