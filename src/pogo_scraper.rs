//! Orchestration of the page scrapers and the combined artifact.

use anyhow::Result;
use serde_json::{Value, json};
use tracing::error;

use crate::artifacts::ArtifactStore;
use crate::fetch::Fetcher;
use crate::scrapers::{eggs::EggScraper, events::EventScraper, research::ResearchScraper};
use crate::traits::PageScraper;

const DEFAULT_BASE_URL: &str = "https://leekduck.com";
const DEFAULT_OUTPUT_DIR: &str = "files";

pub struct PogoScraper {
    fetcher: Fetcher,
    store: ArtifactStore,
    events: EventScraper,
    research: ResearchScraper,
    eggs: EggScraper,
}

impl PogoScraper {
    pub fn new() -> Result<Self> {
        let base_url =
            std::env::var("POGO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let out_dir =
            std::env::var("POGO_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());

        Ok(Self {
            fetcher: Fetcher::new(base_url),
            store: ArtifactStore::new(out_dir)?,
            events: EventScraper,
            research: ResearchScraper,
            eggs: EggScraper,
        })
    }

    /// Runs all page scrapers concurrently, writes the per-page artifacts,
    /// then assembles the combined document from the in-memory values.
    pub async fn run(&self) -> Result<()> {
        let (events, research, eggs) = tokio::join!(
            self.run_scraper(&self.events),
            self.run_scraper(&self.research),
            self.run_scraper(&self.eggs),
        );

        let combined = json!({
            "events": events,
            "research": research,
            "eggs": eggs,
        });
        self.store.write("combined", &combined).await?;

        Ok(())
    }

    /// Runs one scraper best-effort: a failed page is logged and
    /// contributes its empty value instead of aborting the run.
    async fn run_scraper(&self, scraper: &dyn PageScraper) -> Value {
        let value = match scraper.scrape(&self.fetcher).await {
            Ok(value) => value,
            Err(e) => {
                error!("{} scrape failed: {e:#}", scraper.name());
                scraper.empty_value()
            }
        };

        if let Err(e) = self.store.write(scraper.name(), &value).await {
            error!("Failed to write {} artifacts: {e:#}", scraper.name());
        }

        value
    }
}
