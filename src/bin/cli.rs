//! paper-oracle CLI
//!
//! Polls the configured feeds and logs every article/paper association
//! it discovers.

use std::path::PathBuf;

use clap::Parser;
use paper_oracle::{error::Result, logging, models::Config, scraper::Scraper};

/// paper-oracle - science news to paper DOI correlator
#[derive(Parser, Debug)]
#[command(
    name = "paper-oracle",
    version,
    about = "Correlates science news articles with the papers they reference"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Additional feed URL to scrape (repeatable)
    #[arg(short, long = "feed")]
    feed: Vec<String>,

    /// Run a single scrape pass and exit
    #[arg(long)]
    once: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            logging::init(cli.verbose);
            log::error!("Could not parse config file due to error: {}", error);
            return Err(error);
        }
    };
    logging::init(cli.verbose || config.debug);

    log::info!("Loaded configuration from {}", cli.config.display());

    let (mut scraper, mut handle) = Scraper::new(config)?;
    for feed in cli.feed {
        scraper.add_feed(feed);
    }

    if cli.once {
        scraper.scrape_pass().await;
        log::info!("Done!");
        return Ok(());
    }

    log::info!("Starting feed poller (Ctrl-C to stop)");
    let poller = tokio::spawn(scraper.run());

    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Interrupt received, stopping crawler"),
        Err(error) => log::error!("Failed to listen for shutdown signal: {}", error),
    }
    handle.stop();
    handle.wait().await;
    let _ = poller.await;

    log::info!("Done!");

    Ok(())
}
