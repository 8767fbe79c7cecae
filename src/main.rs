//! itad-compare - Game price comparison CLI
//!
//! Looks up current deals for a game title on IsThereAnyDeal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use itad_compare::commands::{RandomCommand, SearchCommand, ShopsCommand};
use itad_compare::config::{parse_country, Config, OutputFormat, SortOrder};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "itad-compare",
    version,
    about = "Compare current game prices across shops",
    long_about = "Searches IsThereAnyDeal for a game title and shows the best current deals per shop."
)]
struct Cli {
    /// IsThereAnyDeal API key
    #[arg(long, global = true, env = "ITAD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Country for prices and shops (two-letter code)
    #[arg(long, global = true, env = "ITAD_COUNTRY", value_parser = parse_country)]
    country: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "ITAD_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search deals for a game title
    #[command(alias = "s")]
    Search {
        /// Game title
        title: String,

        /// Maximum number of games to look up (1-100)
        #[arg(short, long)]
        max: Option<usize>,

        /// Only keep deals from these shops (comma-separated)
        #[arg(long, value_delimiter = ',')]
        shops: Option<Vec<String>>,

        /// Minimum deal price
        #[arg(long)]
        min_price: Option<f64>,

        /// Maximum deal price
        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum discount in percent
        #[arg(long)]
        min_cut: Option<u32>,

        /// Card order: relevance, price, title
        #[arg(long)]
        sort: Option<SortOrder>,
    },

    /// List shops for the selected country
    Shops,

    /// Pick a popular game title from the Steam charts
    Random {
        /// Search deals for the picked title right away
        #[arg(long)]
        search: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if let Some(country) = cli.country {
        config.country = country;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    // Missing key is fatal before any request is made
    config.require_api_key()?;

    let color = config.format == OutputFormat::Table && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Search { title, max, shops, min_price, max_price, min_cut, sort } => {
            if let Some(max) = max {
                config.max_results = max;
            }
            if let Some(shops) = shops {
                config.shops = shops;
            }
            if min_price.is_some() {
                config.min_price = min_price;
            }
            if max_price.is_some() {
                config.max_price = max_price;
            }
            if min_cut.is_some() {
                config.min_cut = min_cut;
            }
            if let Some(sort) = sort {
                config.sort = sort;
            }

            let cmd = SearchCommand::new(config).with_color(color);
            let output = cmd.execute(&title).await?;
            println!("{}", output);
        }

        Commands::Shops => {
            let cmd = ShopsCommand::new(config);
            println!("{}", cmd.execute().await?);
        }

        Commands::Random { search } => {
            let title = RandomCommand::new(config.clone()).execute().await?;

            if search {
                eprintln!("Searching for {}...", title);
                let cmd = SearchCommand::new(config).with_color(color);
                println!("{}", cmd.execute(&title).await?);
            } else {
                println!("{}", title);
            }
        }
    }

    Ok(())
}
