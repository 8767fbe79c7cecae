//! Deal price filter.

use super::Filter;
use crate::itad::Deal;
use std::ops::RangeInclusive;

/// Keeps deals whose current price lies within an inclusive range.
///
/// Currency is not converted; bounds apply to the amount as quoted for
/// the configured country.
pub struct PriceFilter {
    range: RangeInclusive<f64>,
}

impl PriceFilter {
    /// Missing bounds are open.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let floor = min.unwrap_or(f64::NEG_INFINITY);
        let ceiling = max.unwrap_or(f64::INFINITY);
        Self { range: floor..=ceiling }
    }
}

impl Filter for PriceFilter {
    fn matches(&self, deal: &Deal) -> bool {
        self.range.contains(&deal.price.amount)
    }

    fn description(&self) -> String {
        let (floor, ceiling) = (*self.range.start(), *self.range.end());
        match (floor.is_finite(), ceiling.is_finite()) {
            (true, true) => format!("Price: {:.2} - {:.2}", floor, ceiling),
            (true, false) => format!("Price: >= {:.2}", floor),
            (false, true) => format!("Price: <= {:.2}", ceiling),
            (false, false) => "Price: any".to_string(),
        }
    }
}
