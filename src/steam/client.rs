//! Steam Web API client for the most-played games chart.

use crate::config::Config;
use crate::itad::client::USER_AGENT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

/// Trait for the most-played chart - enables mocking for tests.
#[async_trait]
pub trait MostPlayed: Send + Sync {
    /// Returns Steam appids ordered by rank.
    async fn most_played(&self) -> Result<Vec<u32>>;
}

#[derive(Debug, Deserialize)]
struct ChartsEnvelope {
    response: ChartsResponse,
}

#[derive(Debug, Deserialize)]
struct ChartsResponse {
    #[serde(default)]
    ranks: Vec<RankEntry>,
}

#[derive(Debug, Deserialize)]
struct RankEntry {
    #[serde(default)]
    rank: u32,
    appid: u32,
}

/// Steam Web API client.
pub struct SteamClient {
    client: Client,
    base_url: String,
}

impl SteamClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, base_url: config.steam_base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl MostPlayed for SteamClient {
    async fn most_played(&self) -> Result<Vec<u32>> {
        let url = format!("{}/ISteamChartsService/GetMostPlayedGames/v1/", self.base_url);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Steam returned status: {}", response.status());
        }

        let body = response.text().await.context("Failed to read response body")?;
        let envelope: ChartsEnvelope =
            serde_json::from_str(&body).context("Failed to parse most played chart")?;

        let mut ranks = envelope.response.ranks;
        ranks.sort_by_key(|r| r.rank);

        info!("Steam chart returned {} apps", ranks.len());
        Ok(ranks.into_iter().map(|r| r.appid).collect())
    }
}
