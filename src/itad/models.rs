//! Data models for IsThereAnyDeal API responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Accepts an id sent either as a JSON string or a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {}", other))),
    }
}

/// Deserializes each element on its own and drops the ones that do not fit.
pub(crate) fn collect_valid<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

fn skip_invalid_deals<'de, D>(deserializer: D) -> Result<Vec<Deal>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(collect_valid(items, "deal"))
}

/// A search hit before info and price enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCandidate {
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Game metadata from the info endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assets: Assets,
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub publishers: Option<Vec<Company>>,
    #[serde(default)]
    pub developers: Option<Vec<Company>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub reviews: Option<Vec<Review>>,
    /// "game", "dlc", "package", ...
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl GameInfo {
    /// Banner image URL, if the game has one.
    pub fn image(&self) -> Option<&str> {
        self.assets.banner400.as_deref()
    }

    /// Only entries of type "game" are displayable.
    pub fn is_game(&self) -> bool {
        self.kind.as_deref() == Some("game")
    }

    /// Name of the first listed publisher.
    pub fn first_publisher(&self) -> Option<&str> {
        self.publishers
            .as_ref()?
            .iter()
            .map(|p| p.name.trim())
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub banner400: Option<String>,
}

/// Publisher or developer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub name: String,
}

/// A review aggregate from one source.
///
/// The score is kept raw; sources occasionally send null or text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub source: Option<String>,
}

/// Current deals for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "skip_invalid_deals")]
    pub deals: Vec<Deal>,
}

/// A shop-specific offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub shop: ShopRef,
    pub price: Money,
    /// Percent off, 0 when not discounted
    #[serde(default)]
    pub cut: u32,
    /// Purchase link, possibly percent-encoded
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A shop known to the API for the configured country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
}

/// Result of a Steam appid lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub game: Option<GameCandidate>,
}

/// Case-insensitive shop name to id lookup.
#[derive(Debug, Clone, Default)]
pub struct ShopDirectory {
    by_name: HashMap<String, String>,
}

impl ShopDirectory {
    pub fn new(shops: &[Shop]) -> Self {
        let by_name =
            shops.iter().map(|s| (s.title.trim().to_lowercase(), s.id.clone())).collect();
        Self { by_name }
    }

    /// Returns the shop id for a name.
    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.trim().to_lowercase()).map(String::as_str)
    }

    /// Resolves names to ids; names without a match are returned separately.
    pub fn resolve<'a>(&self, names: &'a [String]) -> (Vec<String>, Vec<&'a str>) {
        let mut ids = Vec::new();
        let mut unknown = Vec::new();

        for name in names {
            match self.id_of(name) {
                Some(id) => ids.push(id.to_string()),
                None => unknown.push(name.as_str()),
            }
        }

        (ids, unknown)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
