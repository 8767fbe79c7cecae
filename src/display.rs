//! Display policy: which games become cards and what each card shows.

use crate::itad::{Deal, GameInfo};
use serde::Serialize;
use serde_json::Value;

/// Deals shown per card.
pub const DEALS_PER_CARD: usize = 3;

/// Shown in place of a deal that has no purchase link.
pub const NO_DEALS: &str = "No deals";

/// Shown in place of a review score that is not a number.
pub const SCORE_FALLBACK: &str = "/";

/// Color of a review score badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewColor {
    Red,
    Orange,
    Green,
    Gray,
}

impl ReviewColor {
    /// Red below 50, orange from 50 to 75 inclusive, green above.
    pub fn for_score(score: f64) -> Self {
        if score < 50.0 {
            ReviewColor::Red
        } else if score <= 75.0 {
            ReviewColor::Orange
        } else {
            ReviewColor::Green
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReviewColor::Red => "red",
            ReviewColor::Orange => "orange",
            ReviewColor::Green => "green",
            ReviewColor::Gray => "gray",
        }
    }
}

/// One deal line on a card.
#[derive(Debug, Clone, Serialize)]
pub struct DealLine {
    pub shop: String,
    pub price: f64,
    pub currency: String,
    /// Percent off, only set when discounted
    pub cut: Option<u32>,
    /// Decoded purchase link
    pub url: Option<String>,
}

impl DealLine {
    fn from_deal(deal: &Deal) -> Self {
        let shop = if deal.shop.name.is_empty() {
            "Unknown".to_string()
        } else {
            deal.shop.name.clone()
        };

        Self {
            shop,
            price: deal.price.amount,
            currency: deal.price.currency.clone().unwrap_or_else(|| "EUR".to_string()),
            cut: (deal.cut > 0).then_some(deal.cut),
            url: decode_url(&deal.url),
        }
    }

    /// Only deals with a purchase link are shown with their price.
    pub fn is_offer(&self) -> bool {
        self.url.is_some()
    }

    /// Price with currency symbol where one is common.
    pub fn price_label(&self) -> String {
        match self.currency.as_str() {
            "EUR" => format!("{:.2}€", self.price),
            "USD" => format!("${:.2}", self.price),
            "GBP" => format!("£{:.2}", self.price),
            other => format!("{:.2} {}", self.price, other),
        }
    }
}

/// Percent-decodes a deal link. Empty links yield `None`; links that do not
/// decode to UTF-8 are returned as sent.
pub fn decode_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    Some(urlencoding::decode(url).map(|u| u.into_owned()).unwrap_or_else(|_| url.to_string()))
}

/// A review score badge.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewBadge {
    pub source: String,
    /// Score as text, or the fallback marker
    pub label: String,
    pub color: ReviewColor,
}

impl ReviewBadge {
    pub fn new(source: Option<&str>, score: &Value) -> Self {
        let source = source.unwrap_or("None").to_string();

        match score.as_f64() {
            Some(n) => Self { source, label: score.to_string(), color: ReviewColor::for_score(n) },
            None => Self { source, label: SCORE_FALLBACK.to_string(), color: ReviewColor::Gray },
        }
    }
}

/// Everything rendered for one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameCard {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub deals: Vec<DealLine>,
    pub release_date: Option<String>,
    pub publisher: Option<String>,
    pub tags: Vec<String>,
    /// `None` when the game has no review data at all
    pub reviews: Option<Vec<ReviewBadge>>,
}

impl GameCard {
    /// Builds a card from joined info and already-filtered deals.
    ///
    /// Returns `None` unless the entry is a game with at least one deal.
    pub fn build(id: &str, info: &GameInfo, deals: &[Deal]) -> Option<Self> {
        if !info.is_game() || deals.is_empty() {
            return None;
        }

        let reviews = info.reviews.as_ref().map(|reviews| {
            reviews.iter().map(|r| ReviewBadge::new(r.source.as_deref(), &r.score)).collect()
        });

        Some(Self {
            id: id.to_string(),
            title: info.title.clone(),
            image: info.image().map(str::to_string),
            deals: deals.iter().take(DEALS_PER_CARD).map(DealLine::from_deal).collect(),
            release_date: info.release_date.clone(),
            publisher: info.first_publisher().map(str::to_string),
            tags: info.tags.clone().unwrap_or_default(),
            reviews,
        })
    }

    /// Lowest shown price.
    pub fn best_price(&self) -> Option<f64> {
        self.deals.iter().filter(|d| d.is_offer()).map(|d| d.price).min_by(|a, b| a.total_cmp(b))
    }
}

/// Summary line for the number of displayed games.
pub fn summary_message(count: usize, title: &str) -> String {
    match count {
        0 => format!("No games found for \"{}\".", title),
        1 => format!("Found 1 game for \"{}\".", title),
        n => format!("Found {} games for \"{}\".", n, title),
    }
}
