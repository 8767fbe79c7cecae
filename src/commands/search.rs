//! Search command: resolve a title, fetch info and prices, render cards.

use crate::config::{Config, SortOrder};
use crate::display::{summary_message, GameCard};
use crate::error::Error;
use crate::filters::{FilterChain, FilterChainBuilder};
use crate::format::Formatter;
use crate::itad::{DealsApi, GameCandidate, GameInfo, ItadClient, PriceRecord, ShopDirectory};
use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Executes a game price search.
pub struct SearchCommand {
    config: Config,
    color: bool,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config, color: false }
    }

    /// Enables colored table output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, title: &str) -> Result<String> {
        let client = ItadClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, title).await
    }

    /// Executes the search with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl DealsApi,
        title: &str,
    ) -> Result<String> {
        let cards = self.collect_cards(client, title).await?;
        let summary = summary_message(cards.len(), title.trim());

        info!("Displaying {} games", cards.len());

        let formatter = Formatter::new(self.config.format).with_color(self.color);
        Ok(formatter.format_cards(&cards, &summary))
    }

    /// Runs the search pipeline and returns the cards to display, in display order.
    pub async fn collect_cards(
        &self,
        client: &impl DealsApi,
        title: &str,
    ) -> Result<Vec<GameCard>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle.into());
        }

        info!("Searching for: {}", title);

        let candidates = match client.search(title, self.config.search_limit()).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Search failed: {:#}", e);
                Vec::new()
            }
        };

        if candidates.is_empty() {
            info!("No candidates for {}", title);
            return Ok(Vec::new());
        }

        debug!("{} candidates", candidates.len());

        let filters = self.build_filters(client).await;
        if !filters.is_empty() {
            debug!("{} active filters: {}", filters.len(), filters.descriptions().join(", "));
        }

        let (infos, prices) =
            fetch_details(client, &candidates, self.config.worker_count()).await;

        let mut ranked: Vec<(usize, GameCard)> = Vec::new();
        for (rank, info) in infos {
            let Some(info) = info else {
                continue;
            };

            let candidate = &candidates[rank];
            let deals = prices.get(&candidate.id).map(|r| r.deals.clone()).unwrap_or_default();
            let deals = filters.apply(deals);

            if let Some(card) = GameCard::build(&candidate.id, &info, &deals) {
                ranked.push((rank, card));
            } else {
                debug!("Skipping {} ({} deals after filtering)", candidate.title, deals.len());
            }
        }

        sort_cards(&mut ranked, self.config.sort);
        Ok(ranked.into_iter().map(|(_, card)| card).collect())
    }

    /// Builds the deal filter chain, loading the shop directory only when needed.
    async fn build_filters(&self, client: &impl DealsApi) -> FilterChain {
        let directory = if self.config.shops.is_empty() {
            ShopDirectory::default()
        } else {
            match client.shops().await {
                Ok(shops) => {
                    let directory = ShopDirectory::new(&shops);
                    if directory.is_empty() {
                        warn!("No shops listed for {}", self.config.country);
                    } else {
                        debug!("Shop directory has {} entries", directory.len());
                    }
                    directory
                }
                Err(e) => {
                    warn!("Failed to load shops: {:#}", e);
                    ShopDirectory::default()
                }
            }
        };

        FilterChainBuilder::new()
            .shops(&directory, &self.config.shops)
            .price_range(self.config.min_price, self.config.max_price)
            .min_cut(self.config.min_cut)
            .build()
    }
}

/// Fetches game info over a bounded pool while the batched price request runs alongside.
///
/// Info results come back in completion order, tagged with the candidate's rank.
async fn fetch_details(
    client: &impl DealsApi,
    candidates: &[GameCandidate],
    workers: usize,
) -> (Vec<(usize, Option<GameInfo>)>, HashMap<String, PriceRecord>) {
    let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();

    let infos = stream::iter(candidates.iter().enumerate())
        .map(|(rank, candidate)| async move {
            match client.game_info(&candidate.id).await {
                Ok(info) => (rank, Some(info)),
                Err(e) => {
                    warn!("Failed to fetch info for {}: {:#}", candidate.id, e);
                    (rank, None)
                }
            }
        })
        .buffer_unordered(workers)
        .collect::<Vec<_>>();

    let prices = async {
        let by_id: HashMap<String, PriceRecord> = match client.prices(&ids).await {
            Ok(records) => records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            Err(e) => {
                warn!("Failed to fetch prices: {:#}", e);
                HashMap::new()
            }
        };
        by_id
    };

    tokio::join!(infos, prices)
}

fn sort_cards(cards: &mut [(usize, GameCard)], order: SortOrder) {
    match order {
        SortOrder::Relevance => cards.sort_by_key(|(rank, _)| *rank),
        SortOrder::Price => cards.sort_by(|(ra, a), (rb, b)| {
            let pa = a.best_price().unwrap_or(f64::INFINITY);
            let pb = b.best_price().unwrap_or(f64::INFINITY);
            pa.total_cmp(&pb).then(ra.cmp(rb))
        }),
        SortOrder::Title => cards.sort_by(|(ra, a), (rb, b)| {
            a.title.to_lowercase().cmp(&b.title.to_lowercase()).then(ra.cmp(rb))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::filters::test_support::make_deal;
    use crate::itad::models::{Deal, Shop};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock deals client for testing.
    #[derive(Default)]
    struct MockDealsClient {
        candidates: Vec<GameCandidate>,
        infos: HashMap<String, GameInfo>,
        deals: HashMap<String, Vec<Deal>>,
        shops: Vec<Shop>,
        info_delay_ms: HashMap<String, u64>,
        fail_search: bool,
        fail_prices: bool,
        search_calls: AtomicU32,
        info_calls: AtomicU32,
        price_calls: AtomicU32,
        shop_calls: AtomicU32,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        price_delay_ms: u64,
        prices_in_flight: AtomicUsize,
        overlaps: AtomicUsize,
        max_total_in_flight: AtomicUsize,
    }

    impl MockDealsClient {
        fn with_game(mut self, id: &str, title: &str, kind: &str, deals: Vec<Deal>) -> Self {
            self.candidates.push(GameCandidate { title: title.to_string(), id: id.to_string() });
            self.infos.insert(
                id.to_string(),
                GameInfo {
                    title: title.to_string(),
                    kind: Some(kind.to_string()),
                    ..GameInfo::default()
                },
            );
            self.deals.insert(id.to_string(), deals);
            self
        }

        fn with_shops(mut self) -> Self {
            self.shops = vec![
                Shop { id: "61".to_string(), title: "Steam".to_string() },
                Shop { id: "35".to_string(), title: "GOG".to_string() },
            ];
            self
        }
    }

    #[async_trait]
    impl DealsApi for MockDealsClient {
        async fn search(&self, _title: &str, max_results: usize) -> Result<Vec<GameCandidate>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_search {
                anyhow::bail!("Simulated network error");
            }
            Ok(self.candidates.iter().take(max_results).cloned().collect())
        }

        async fn game_info(&self, id: &str) -> Result<GameInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let prices = self.prices_in_flight.load(Ordering::SeqCst);
            if prices > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            let total = now + prices;
            self.max_total_in_flight.fetch_max(total, Ordering::SeqCst);

            let delay = self.info_delay_ms.get(id).copied().unwrap_or(1);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            match self.infos.get(id) {
                Some(info) => Ok(info.clone()),
                None => anyhow::bail!("IsThereAnyDeal returned status: 404 Not Found"),
            }
        }

        async fn prices(&self, ids: &[String]) -> Result<Vec<PriceRecord>> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            self.prices_in_flight.fetch_add(1, Ordering::SeqCst);
            let infos = self.in_flight.load(Ordering::SeqCst);
            if infos > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            self.max_total_in_flight.fetch_max(infos + 1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(self.price_delay_ms)).await;
            self.prices_in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_prices {
                anyhow::bail!("Simulated network error");
            }
            Ok(ids
                .iter()
                .filter_map(|id| {
                    self.deals.get(id).map(|d| PriceRecord { id: id.clone(), deals: d.clone() })
                })
                .collect())
        }

        async fn shops(&self) -> Result<Vec<Shop>> {
            self.shop_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.shops.clone())
        }

        async fn lookup_appid(&self, _appid: u32) -> Result<Option<GameCandidate>> {
            Ok(None)
        }
    }

    fn make_test_config() -> Config {
        Config { api_key: Some("test".to_string()), max_results: 10, ..Config::default() }
    }

    fn steam(amount: f64) -> Deal {
        make_deal("61", "Steam", amount, 0)
    }

    #[tokio::test]
    async fn test_n_info_calls_one_price_call() {
        let mut client = MockDealsClient::default();
        for i in 0..12 {
            client = client.with_game(&format!("g{}", i), &format!("Game {}", i), "game", vec![steam(5.0)]);
        }

        let mut config = make_test_config();
        config.max_results = 100;
        let cmd = SearchCommand::new(config);
        let cards = cmd.collect_cards(&client, "game").await.unwrap();

        assert_eq!(cards.len(), 12);
        assert_eq!(client.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.info_calls.load(Ordering::SeqCst), 12);
        assert_eq!(client.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.shop_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worker_pool_is_bounded() {
        let mut client = MockDealsClient::default();
        for i in 0..20 {
            let id = format!("g{}", i);
            client.info_delay_ms.insert(id.clone(), 10);
            client = client.with_game(&id, "Game", "game", vec![steam(5.0)]);
        }

        let mut config = make_test_config();
        config.max_results = 100;
        config.workers = 5;
        SearchCommand::new(config).collect_cards(&client, "game").await.unwrap();

        let max = client.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 5, "max in flight was {}", max);
        assert!(max > 1, "fetches did not overlap");
    }

    #[tokio::test]
    async fn test_price_call_overlaps_info_pool() {
        let mut client = MockDealsClient { price_delay_ms: 25, ..MockDealsClient::default() };
        for i in 0..20 {
            let id = format!("g{}", i);
            client.info_delay_ms.insert(id.clone(), 10);
            client = client.with_game(&id, "Game", "game", vec![steam(5.0)]);
        }

        let mut config = make_test_config();
        config.max_results = 100;
        config.workers = 5;
        let cards = SearchCommand::new(config).collect_cards(&client, "game").await.unwrap();

        assert_eq!(cards.len(), 20);
        assert_eq!(client.price_calls.load(Ordering::SeqCst), 1);

        let overlaps = client.overlaps.load(Ordering::SeqCst);
        assert!(overlaps > 0, "price call did not run alongside info fetches");

        let total = client.max_total_in_flight.load(Ordering::SeqCst);
        assert!(total <= 6, "max total in flight was {}", total);
        assert!(total > 1);
    }

    #[tokio::test]
    async fn test_duplicate_candidate_ids_keep_deals() {
        let client = MockDealsClient::default()
            .with_game("g1", "Portent", "game", vec![steam(4.99)])
            .with_game("g1", "Portent", "game", vec![steam(4.99)]);

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "x").await.unwrap();

        assert_eq!(client.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.deals.len() == 1));
    }

    #[tokio::test]
    async fn test_relevance_order_despite_completion_order() {
        let mut client = MockDealsClient::default()
            .with_game("slow", "Slow Game", "game", vec![steam(5.0)])
            .with_game("fast", "Fast Game", "game", vec![steam(5.0)]);
        client.info_delay_ms.insert("slow".to_string(), 30);

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "game").await.unwrap();

        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Slow Game", "Fast Game"]);
    }

    #[tokio::test]
    async fn test_only_games_with_deals_displayed() {
        let client = MockDealsClient::default()
            .with_game("g1", "Portent", "game", vec![steam(9.99)])
            .with_game("g2", "Portent Soundtrack", "dlc", vec![steam(2.99)])
            .with_game("g3", "Portent Beta", "game", Vec::new());

        let cmd = SearchCommand::new(make_test_config());
        let output = cmd.execute_with_client(&client, "Portent").await.unwrap();

        assert!(output.contains("Portent"));
        assert!(!output.contains("Portent Soundtrack"));
        assert!(!output.contains("Portent Beta"));
        assert!(output.contains("Found 1 game for \"Portent\"."));
    }

    #[tokio::test]
    async fn test_failed_info_does_not_abort_batch() {
        let mut client = MockDealsClient::default()
            .with_game("g1", "Alpha", "game", vec![steam(1.0)])
            .with_game("g2", "Beta", "game", vec![steam(2.0)]);
        client.infos.remove("g1");

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "x").await.unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Beta");
        assert_eq!(client.info_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_search_yields_no_results() {
        let client = MockDealsClient { fail_search: true, ..MockDealsClient::default() };

        let cmd = SearchCommand::new(make_test_config());
        let output = cmd.execute_with_client(&client, "Portent").await.unwrap();

        assert_eq!(output, "No games found for \"Portent\".");
        assert_eq!(client.info_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.price_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_prices_yields_no_cards() {
        let mut client =
            MockDealsClient::default().with_game("g1", "Alpha", "game", vec![steam(1.0)]);
        client.fail_prices = true;

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "x").await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let client = MockDealsClient::default();
        let result = SearchCommand::new(make_test_config()).collect_cards(&client, "   ").await;

        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyTitle)));
        assert_eq!(client.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shop_filter_applied() {
        let client = MockDealsClient::default()
            .with_shops()
            .with_game("g1", "Alpha", "game", vec![steam(1.0), make_deal("35", "GOG", 2.0, 10)])
            .with_game("g2", "Beta", "game", vec![make_deal("99", "Other", 0.5, 90)]);

        let mut config = make_test_config();
        config.shops = vec!["gog".to_string()];
        let cmd = SearchCommand::new(config);
        let cards = cmd.collect_cards(&client, "x").await.unwrap();

        assert_eq!(client.shop_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Alpha");
        assert_eq!(cards[0].deals.len(), 1);
        assert_eq!(cards[0].deals[0].shop, "GOG");
    }

    #[tokio::test]
    async fn test_price_and_cut_filters() {
        let client = MockDealsClient::default()
            .with_game("g1", "Alpha", "game", vec![make_deal("61", "Steam", 30.0, 50)])
            .with_game("g2", "Beta", "game", vec![make_deal("61", "Steam", 10.0, 10)])
            .with_game("g3", "Gamma", "game", vec![make_deal("61", "Steam", 5.0, 80)]);

        let mut config = make_test_config();
        config.max_price = Some(20.0);
        config.min_cut = Some(50);
        let cards = SearchCommand::new(config).collect_cards(&client, "x").await.unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Gamma");
    }

    #[tokio::test]
    async fn test_min_price_filter() {
        let client = MockDealsClient::default()
            .with_game("g1", "Alpha", "game", vec![steam(0.99), steam(7.5)])
            .with_game("g2", "Beta", "game", vec![steam(1.99)]);

        let mut config = make_test_config();
        config.min_price = Some(2.0);
        let cards = SearchCommand::new(config).collect_cards(&client, "x").await.unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Alpha");
        assert_eq!(cards[0].deals.len(), 1);
        assert_eq!(cards[0].deals[0].price, 7.5);
    }

    #[tokio::test]
    async fn test_at_most_three_deals_per_card() {
        let deals: Vec<Deal> = (0..10).map(|i| steam(i as f64)).collect();
        let client = MockDealsClient::default().with_game("g1", "Alpha", "game", deals);

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "x").await.unwrap();
        assert_eq!(cards[0].deals.len(), 3);
    }

    #[tokio::test]
    async fn test_sort_by_price_and_title() {
        let client = MockDealsClient::default()
            .with_game("g1", "charlie", "game", vec![steam(20.0)])
            .with_game("g2", "Alpha", "game", vec![steam(30.0)])
            .with_game("g3", "bravo", "game", vec![steam(10.0)]);

        let mut config = make_test_config();
        config.sort = SortOrder::Price;
        let cards = SearchCommand::new(config.clone()).collect_cards(&client, "x").await.unwrap();
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["bravo", "charlie", "Alpha"]);

        config.sort = SortOrder::Title;
        let cards = SearchCommand::new(config).collect_cards(&client, "x").await.unwrap();
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn test_max_results_limits_candidates() {
        let mut client = MockDealsClient::default();
        for i in 0..15 {
            client = client.with_game(&format!("g{}", i), "Game", "game", vec![steam(1.0)]);
        }

        let cards =
            SearchCommand::new(make_test_config()).collect_cards(&client, "x").await.unwrap();
        assert_eq!(cards.len(), 10);
        assert_eq!(client.info_calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_json_output() {
        let client = MockDealsClient::default().with_game("g1", "Alpha", "game", vec![steam(1.0)]);

        let mut config = make_test_config();
        config.format = OutputFormat::Json;
        let output = SearchCommand::new(config).execute_with_client(&client, "Alpha").await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["games"][0]["id"], "g1");
    }
}
