//! Minimum discount filter.

use super::Filter;
use crate::itad::Deal;

/// Filters deals by minimum percent off.
pub struct CutFilter {
    min_cut: u32,
}

impl CutFilter {
    pub fn new(min_cut: u32) -> Self {
        Self { min_cut: min_cut.min(100) }
    }
}

impl Filter for CutFilter {
    fn matches(&self, deal: &Deal) -> bool {
        deal.cut >= self.min_cut
    }

    fn description(&self) -> String {
        format!("Discount: >= {}%", self.min_cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::make_deal;

    #[test]
    fn test_cut_filter() {
        let filter = CutFilter::new(50);

        assert!(!filter.matches(&make_deal("61", "Steam", 10.0, 0)));
        assert!(!filter.matches(&make_deal("61", "Steam", 10.0, 49)));
        assert!(filter.matches(&make_deal("61", "Steam", 10.0, 50)));
        assert!(filter.matches(&make_deal("61", "Steam", 10.0, 90)));
    }

    #[test]
    fn test_zero_passes_everything() {
        let filter = CutFilter::new(0);
        assert!(filter.matches(&make_deal("61", "Steam", 10.0, 0)));
    }

    #[test]
    fn test_clamping() {
        let filter = CutFilter::new(250);
        assert_eq!(filter.min_cut, 100);
    }

    #[test]
    fn test_description() {
        assert_eq!(CutFilter::new(25).description(), "Discount: >= 25%");
    }
}
