//! Shop selection filter.

use super::Filter;
use crate::itad::Deal;
use std::collections::HashSet;

/// Keeps deals from a fixed set of shop ids.
pub struct ShopFilter {
    ids: HashSet<String>,
    names: Vec<String>,
}

impl ShopFilter {
    /// Creates a filter from resolved shop ids and the names the user asked for.
    pub fn new(ids: impl IntoIterator<Item = String>, names: Vec<String>) -> Self {
        Self { ids: ids.into_iter().collect(), names }
    }

    pub fn contains(&self, shop_id: &str) -> bool {
        self.ids.contains(shop_id)
    }
}

impl Filter for ShopFilter {
    fn matches(&self, deal: &Deal) -> bool {
        self.contains(&deal.shop.id)
    }

    fn description(&self) -> String {
        format!("Shops: {}", self.names.join(", "))
    }
}
