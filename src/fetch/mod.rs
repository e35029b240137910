//! HTTP acquisition of the listing pages and the events feed.

use anyhow::Result;
use reqwest::Client;
use tracing::info;

use crate::models::FeedEntry;

pub struct Fetcher {
    client: Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page and returns its raw HTML.
    pub async fn fetch_page(&self, path: &str) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        info!("Fetching {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch {url}: {}",
                response.status()
            ));
        }

        Ok(response.text().await?)
    }

    /// Fetches and deserializes the events feed.
    pub async fn fetch_feed(&self, path: &str) -> Result<Vec<FeedEntry>> {
        let url = format!("{}{path}", self.base_url);
        info!("Fetching feed {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch feed {url}: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

impl Clone for Fetcher {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
