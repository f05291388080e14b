//! Tagged ordering strategies.
//!
//! One assignment engine, parameterized by the strategy that decides which
//! product gets the next batch. Each proposal of a run uses one strategy.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{rules, OrderingContext, RuleEngine};
use crate::models::{Product, WorkDay};

const PAIR_SPREAD: u64 = 0xD6E8_FEB8_6659_FD93;

/// Product ordering used in one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderingStrategy {
    /// Most open units first, then product ID.
    DescendingDemand,
    /// Product ID order.
    AscendingProductId,
    /// Longest standard time first, then most open units, then product ID.
    DescendingStandardTime,
}

impl OrderingStrategy {
    /// Rule engine implementing the strategy.
    pub fn rule_engine(self) -> RuleEngine {
        match self {
            Self::DescendingDemand => RuleEngine::new().with_rule(rules::MostRemaining),
            Self::AscendingProductId => RuleEngine::new(),
            Self::DescendingStandardTime => RuleEngine::new()
                .with_rule(rules::LongestStandardTime)
                .with_rule(rules::MostRemaining),
        }
    }
}

impl fmt::Display for OrderingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DescendingDemand => "descending-demand",
            Self::AscendingProductId => "ascending-product-id",
            Self::DescendingStandardTime => "descending-standard-time",
        };
        f.write_str(label)
    }
}

/// Product ordering for one run: a strategy, optionally replaced by a
/// seeded pseudorandom permutation.
///
/// A perturbed ordering also ranks (station, operator) pairs, so plans can
/// differ even when only one product has demand.
#[derive(Debug, Clone)]
pub struct ProductOrdering {
    strategy: OrderingStrategy,
    perturbation_seed: Option<u64>,
    engine: RuleEngine,
    shuffle_keys: Vec<(String, u64)>,
}

impl ProductOrdering {
    /// Ordering driven purely by the strategy's rules.
    pub fn from_strategy(strategy: OrderingStrategy) -> Self {
        Self {
            strategy,
            perturbation_seed: None,
            engine: strategy.rule_engine(),
            shuffle_keys: Vec::new(),
        }
    }

    /// Ordering by a fixed-seed permutation of `products`.
    ///
    /// The same seed and product list always give the same permutation.
    pub fn perturbed(strategy: OrderingStrategy, seed: u64, products: &[Product]) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let shuffle_keys = products
            .iter()
            .map(|p| (p.id.clone(), rng.random::<u32>() as u64))
            .collect();
        Self {
            strategy,
            perturbation_seed: Some(seed),
            engine: RuleEngine::new().with_rule(rules::SeededShuffle),
            shuffle_keys,
        }
    }

    pub fn strategy(&self) -> OrderingStrategy {
        self.strategy
    }

    pub fn perturbation_seed(&self) -> Option<u64> {
        self.perturbation_seed
    }

    /// Seeded rank of a (station, operator) pair on `day`, lower first.
    ///
    /// `None` unless the ordering is perturbed. Indices are reference
    /// positions of the station and operator.
    pub fn pair_key(&self, day: WorkDay, station: usize, operator: usize) -> Option<u64> {
        let seed = self.perturbation_seed?;
        let salt = ((day.index() as u64) << 48) | ((station as u64) << 24) | operator as u64;
        let mut rng = SmallRng::seed_from_u64(seed ^ salt.wrapping_mul(PAIR_SPREAD));
        Some(rng.random())
    }

    /// Adds the permutation keys (if any) to a context.
    pub fn decorate(&self, mut context: OrderingContext) -> OrderingContext {
        for (id, key) in &self.shuffle_keys {
            context.shuffle_keys.insert(id.clone(), *key);
        }
        context
    }

    /// Product indices in placement order.
    pub fn order(&self, products: &[Product], context: &OrderingContext) -> Vec<usize> {
        self.engine.sort_indices(products, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<Product>, OrderingContext) {
        let products = vec![Product::new("A"), Product::new("B"), Product::new("C")];
        let ctx = OrderingContext::new()
            .with_remaining("A", 5)
            .with_remaining("B", 20)
            .with_remaining("C", 5)
            .with_standard_time("A", 15)
            .with_standard_time("B", 10)
            .with_standard_time("C", 60);
        (products, ctx)
    }

    fn ids(products: &[Product], idx: Vec<usize>) -> Vec<&str> {
        idx.into_iter().map(|i| products[i].id.as_str()).collect()
    }

    #[test]
    fn test_descending_demand() {
        let (ps, ctx) = sample();
        let o = ProductOrdering::from_strategy(OrderingStrategy::DescendingDemand);
        // B most demand; A and C tie → by id
        assert_eq!(ids(&ps, o.order(&ps, &ctx)), ["B", "A", "C"]);
    }

    #[test]
    fn test_ascending_product_id() {
        let (ps, ctx) = sample();
        let o = ProductOrdering::from_strategy(OrderingStrategy::AscendingProductId);
        assert_eq!(ids(&ps, o.order(&ps, &ctx)), ["A", "B", "C"]);
    }

    #[test]
    fn test_descending_standard_time() {
        let (ps, ctx) = sample();
        let o = ProductOrdering::from_strategy(OrderingStrategy::DescendingStandardTime);
        assert_eq!(ids(&ps, o.order(&ps, &ctx)), ["C", "A", "B"]);
    }

    #[test]
    fn test_perturbed_is_reproducible() {
        let (ps, ctx) = sample();
        let a = ProductOrdering::perturbed(OrderingStrategy::DescendingDemand, 42, &ps);
        let b = ProductOrdering::perturbed(OrderingStrategy::DescendingDemand, 42, &ps);
        let order_a = a.order(&ps, &a.decorate(ctx.clone()));
        let order_b = b.order(&ps, &b.decorate(ctx));
        assert_eq!(order_a, order_b);
        assert_eq!(a.perturbation_seed(), Some(42));
        assert_eq!(a.strategy(), OrderingStrategy::DescendingDemand);
    }

    #[test]
    fn test_perturbed_orders_vary_with_seed() {
        let ps: Vec<Product> = (0..8).map(|i| Product::new(format!("P{i}"))).collect();
        let ctx = OrderingContext::new();
        let orders: std::collections::HashSet<Vec<usize>> = (0..10u64)
            .map(|seed| {
                let o = ProductOrdering::perturbed(OrderingStrategy::AscendingProductId, seed, &ps);
                o.order(&ps, &o.decorate(ctx.clone()))
            })
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn test_pair_keys() {
        let plain = ProductOrdering::from_strategy(OrderingStrategy::DescendingDemand);
        assert_eq!(plain.pair_key(WorkDay::Monday, 0, 0), None);

        let ps = vec![Product::new("A")];
        let a = ProductOrdering::perturbed(OrderingStrategy::DescendingDemand, 9, &ps);
        let b = ProductOrdering::perturbed(OrderingStrategy::DescendingDemand, 9, &ps);
        assert_eq!(a.pair_key(WorkDay::Tuesday, 1, 2), b.pair_key(WorkDay::Tuesday, 1, 2));
        assert!(a.pair_key(WorkDay::Monday, 0, 0).is_some());

        // Keys differ across days and operators, so pair order varies
        let a_ref = &a;
        let keys: std::collections::HashSet<u64> = WorkDay::ALL
            .iter()
            .flat_map(|&d| (0..3).filter_map(move |op| a_ref.pair_key(d, 0, op)))
            .collect();
        assert!(keys.len() > 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderingStrategy::DescendingDemand.to_string(), "descending-demand");
    }
}
