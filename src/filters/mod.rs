//! Deal filtering with composable filters.

pub mod cut;
pub mod price;
pub mod shop;

use crate::itad::{Deal, ShopDirectory};
use tracing::warn;

pub use cut::CutFilter;
pub use price::PriceFilter;
pub use shop::ShopFilter;

/// Trait for filtering deals.
pub trait Filter: Send + Sync {
    /// Returns true if the deal passes the filter.
    fn matches(&self, deal: &Deal) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// A chain of filters that must all pass.
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Creates an empty filter chain.
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Adds a filter to the chain.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Checks if a deal passes all filters.
    pub fn matches(&self, deal: &Deal) -> bool {
        self.filters.iter().all(|f| f.matches(deal))
    }

    /// Keeps matching deals, preserving input order.
    pub fn apply(&self, deals: Vec<Deal>) -> Vec<Deal> {
        deals.into_iter().filter(|d| self.matches(d)).collect()
    }

    /// Returns true if no filters are configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns descriptions of all filters.
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a FilterChain from configuration.
pub struct FilterChainBuilder {
    chain: FilterChain,
}

impl FilterChainBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self { chain: FilterChain::new() }
    }

    /// Adds a shop filter for the named shops.
    ///
    /// No names means every shop passes. Names the directory does not know
    /// are skipped with a warning.
    pub fn shops(mut self, directory: &ShopDirectory, names: &[String]) -> Self {
        if names.is_empty() {
            return self;
        }

        let (ids, unknown) = directory.resolve(names);
        for name in unknown {
            warn!("Unknown shop: {}", name);
        }

        self.chain.add(ShopFilter::new(ids, names.to_vec()));
        self
    }

    /// Adds a deal price range filter.
    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.chain.add(PriceFilter::new(min, max));
        }
        self
    }

    /// Adds a minimum discount filter.
    pub fn min_cut(mut self, min: Option<u32>) -> Self {
        if let Some(min) = min {
            self.chain.add(CutFilter::new(min));
        }
        self
    }

    /// Builds the filter chain.
    pub fn build(self) -> FilterChain {
        self.chain
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
