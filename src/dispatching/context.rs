//! Ordering context for product-priority rules.

use std::collections::HashMap;

/// Runtime state passed to ordering rules.
///
/// Rebuilt before every pass of a day, so rules always see the demand that
/// is still open rather than the week's initial figures.
#[derive(Debug, Clone, Default)]
pub struct OrderingContext {
    /// Units still to place per product.
    pub remaining_units: HashMap<String, u32>,
    /// Longest producible standard time per product (minutes).
    pub longest_standard_time: HashMap<String, i64>,
    /// Pseudorandom sort keys per product (perturbed runs only).
    pub shuffle_keys: HashMap<String, u64>,
}

impl OrderingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the open demand of a product.
    pub fn with_remaining(mut self, product_id: impl Into<String>, units: u32) -> Self {
        self.remaining_units.insert(product_id.into(), units);
        self
    }

    /// Sets the longest standard time of a product.
    pub fn with_standard_time(mut self, product_id: impl Into<String>, minutes: i64) -> Self {
        self.longest_standard_time.insert(product_id.into(), minutes);
        self
    }

    /// Sets the shuffle key of a product.
    pub fn with_shuffle_key(mut self, product_id: impl Into<String>, key: u64) -> Self {
        self.shuffle_keys.insert(product_id.into(), key);
        self
    }
}
