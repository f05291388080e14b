//! Rule engine for multi-criteria product ordering.
//!
//! Composes ordering rules lexicographically: the first rule decides, later
//! rules only break its ties, and product ID keeps the order total.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{OrderingContext, OrderingRule};
use crate::models::Product;

/// A composable rule engine for product prioritization.
///
/// # Example
/// ```
/// use u_roster::dispatching::{rules, OrderingContext, RuleEngine};
/// use u_roster::models::Product;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::MostRemaining)
///     .with_rule(rules::LongestStandardTime);
///
/// let products = vec![Product::new("A"), Product::new("B")];
/// let ctx = OrderingContext::new().with_remaining("B", 10).with_remaining("A", 2);
/// assert_eq!(engine.sort_indices(&products, &ctx), vec![1, 0]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn OrderingRule>>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an engine with no rules (pure product-ID order).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Appends a rule; earlier rules take precedence.
    pub fn with_rule<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the configured rules, in precedence order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts products by priority (highest priority first).
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, products: &[Product], context: &OrderingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..products.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&products[a], &products[b], context));
        indices
    }

    fn compare(&self, a: &Product, b: &Product, context: &OrderingContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        // All rules tied → product ID
        a.id.cmp(&b.id)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
