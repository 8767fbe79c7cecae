//! Shop listing command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::itad::{DealsApi, ItadClient};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Lists the shops available for the configured country.
pub struct ShopsCommand {
    config: Config,
}

impl ShopsCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<String> {
        let client = ItadClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Lists shops with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl DealsApi) -> Result<String> {
        let mut shops = match client.shops().await {
            Ok(shops) => shops,
            Err(e) => {
                warn!("Failed to load shops: {:#}", e);
                Vec::new()
            }
        };

        shops.sort_by_key(|s| s.title.to_lowercase());
        info!("Found {} shops for {}", shops.len(), self.config.country);

        Ok(Formatter::new(self.config.format).format_shops(&shops))
    }
}
