//! HTTP client for the IsThereAnyDeal API.

use super::models::{collect_valid, GameCandidate, GameInfo, LookupResponse, PriceRecord, Shop};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

pub(crate) const USER_AGENT: &str = concat!("itad-compare/", env!("CARGO_PKG_VERSION"));

/// Trait for deal API operations - enables mocking for tests.
#[async_trait]
pub trait DealsApi: Send + Sync {
    /// Searches games by title.
    async fn search(&self, title: &str, max_results: usize) -> Result<Vec<GameCandidate>>;

    /// Fetches metadata for one game.
    async fn game_info(&self, id: &str) -> Result<GameInfo>;

    /// Fetches current deals for all ids in a single request.
    async fn prices(&self, ids: &[String]) -> Result<Vec<PriceRecord>>;

    /// Lists shops for the configured country.
    async fn shops(&self) -> Result<Vec<Shop>>;

    /// Resolves a Steam appid to a game, if the API knows it.
    async fn lookup_appid(&self, appid: u32) -> Result<Option<GameCandidate>>;
}

/// IsThereAnyDeal HTTP client.
pub struct ItadClient {
    client: Client,
    base_url: String,
    api_key: String,
    country: String,
}

impl ItadClient {
    /// Creates a new client from configuration. Fails without an API key.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.itad_base_url.trim_end_matches('/').to_string(),
            api_key,
            country: config.country.clone(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}?key={}", self.base_url, path, urlencoding::encode(&self.api_key));
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Sends a GET and parses the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Sends a POST with a JSON body and parses the JSON response.
    async fn post_json<T: DeserializeOwned>(&self, url: &str, body: Vec<u8>) -> Result<T> {
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .body(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: wreq::Response) -> Result<T> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            anyhow::bail!("IsThereAnyDeal returned status: {}", status);
        }

        let body = response.text().await.context("Failed to read response body")?;
        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

#[async_trait]
impl DealsApi for ItadClient {
    async fn search(&self, title: &str, max_results: usize) -> Result<Vec<GameCandidate>> {
        let results = max_results.to_string();
        let url = self.url(
            "/games/search/v1",
            &[("title", title), ("country", &self.country), ("results", &results)],
        );

        info!("Searching IsThereAnyDeal: {}", title);
        let hits: Vec<Value> = self.get_json(&url).await?;
        Ok(collect_valid(hits, "search result"))
    }

    async fn game_info(&self, id: &str) -> Result<GameInfo> {
        let url = self.url("/games/info/v2", &[("id", id)]);

        debug!("GET game info {}", id);
        self.get_json(&url).await
    }

    async fn prices(&self, ids: &[String]) -> Result<Vec<PriceRecord>> {
        let url = self.url("/games/prices/v3", &[("country", &self.country)]);
        let body = serde_json::to_vec(ids)?;

        info!("Fetching prices for {} games", ids.len());
        let records: Vec<Value> = self.post_json(&url, body).await?;
        Ok(collect_valid(records, "price record"))
    }

    async fn shops(&self) -> Result<Vec<Shop>> {
        let url = self.url("/service/shops/v1", &[("country", &self.country)]);

        debug!("GET shops for {}", self.country);
        self.get_json(&url).await
    }

    async fn lookup_appid(&self, appid: u32) -> Result<Option<GameCandidate>> {
        let appid = appid.to_string();
        let url = self.url("/games/lookup/v1", &[("appid", &appid)]);

        debug!("Looking up Steam app {}", appid);
        let lookup: LookupResponse = self.get_json(&url).await?;
        Ok(if lookup.found { lookup.game } else { None })
    }
}
