use anyhow::Result;
use tracing::info;

mod artifacts;
mod fetch;
mod models;
mod normalize;
mod pogo_scraper;
mod scrapers;
mod traits;

use pogo_scraper::PogoScraper;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting Pokémon GO game-data scraper");

    let scraper = PogoScraper::new()?;
    scraper.run().await?;

    info!("Scrape run complete");
    Ok(())
}
