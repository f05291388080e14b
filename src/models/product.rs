//! Product model.
//!
//! A product is what demand is expressed in. Its subsystem (family) tag is
//! the key used to aggregate proposal summaries.

use serde::{Deserialize, Serialize};

/// A producible item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: String,
    /// Human-readable description.
    pub name: String,
    /// Subsystem / family tag used for summary aggregation.
    pub subsystem: String,
}

impl Product {
    /// Creates a product whose subsystem tag equals its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            subsystem: id.clone(),
            id,
            name: String::new(),
        }
    }

    /// Sets the description.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the subsystem tag.
    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder() {
        let p = Product::new("P1").with_name("Pump body").with_subsystem("HYD");
        assert_eq!(p.id, "P1");
        assert_eq!(p.name, "Pump body");
        assert_eq!(p.subsystem, "HYD");
    }

    #[test]
    fn test_product_default_subsystem() {
        assert_eq!(Product::new("P2").subsystem, "P2");
    }
}
