//! Trait seam between the orchestrator and the per-page scrapers

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::fetch::Fetcher;

/// A scraper for one page of the source site.
///
/// Each implementation fetches its inputs, extracts typed records, and
/// returns the JSON-serializable artifact value. Extraction itself is
/// pure; all I/O goes through the supplied [`Fetcher`].
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Artifact name, also the output filename stem.
    fn name(&self) -> &'static str;

    /// Page path under the site base URL.
    fn page_path(&self) -> &'static str;

    /// Fetch the page and extract its records.
    async fn scrape(&self, fetcher: &Fetcher) -> Result<Value>;

    /// Value contributed when this scraper fails; keeps the artifact and
    /// combined-document shapes stable across partial failures.
    fn empty_value(&self) -> Value {
        Value::Array(Vec::new())
    }
}
