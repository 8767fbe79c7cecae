//! Random example title from the Steam most-played chart.

use crate::config::Config;
use crate::error::Error;
use crate::itad::{DealsApi, ItadClient};
use crate::steam::{MostPlayed, SteamClient};
use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info, warn};

/// Picks a currently popular title to search for.
pub struct RandomCommand {
    config: Config,
}

impl RandomCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<String> {
        let deals = ItadClient::new(&self.config).context("Failed to create HTTP client")?;
        let steam = SteamClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_clients(&steam, &deals).await
    }

    /// Picks a title with provided clients (for testing).
    ///
    /// Gives up after `seed_attempts` lookups.
    pub async fn execute_with_clients(
        &self,
        chart: &impl MostPlayed,
        deals: &impl DealsApi,
    ) -> Result<String> {
        let apps = chart.most_played().await.context("Failed to load most played games")?;
        let attempts = self.config.seed_attempts.max(1);

        if apps.is_empty() {
            return Err(Error::EmptyChart.into());
        }

        for attempt in 1..=attempts {
            let appid = apps[rand::rng().random_range(0..apps.len())];
            debug!("Attempt {}/{}: Steam app {}", attempt, attempts, appid);

            match deals.lookup_appid(appid).await {
                Ok(Some(game)) => {
                    info!("Picked example title: {}", game.title);
                    return Ok(game.title);
                }
                Ok(None) => debug!("Steam app {} is unknown", appid),
                Err(e) => warn!("Lookup for Steam app {} failed: {:#}", appid, e),
            }
        }

        Err(Error::NoExampleTitle { attempts }.into())
    }
}
