//! Nyaa.si index client.

use async_trait::async_trait;
use riptide_core::TorrentSummary;
use serde::Deserialize;

use super::fetch_json;
use crate::error::ProviderError;
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5362/api/nyaasi";
const PROVIDER_NAME: &str = "NyaaSi";

/// Client for the Nyaa.si scraper endpoint.
pub struct NyaaProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NyaaTorrent {
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    date_uploaded: String,
    #[serde(default)]
    seeders: String,
    #[serde(default)]
    leechers: String,
    #[serde(default)]
    magnet: String,
}

impl NyaaProvider {
    /// Client against the default endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Client against a custom endpoint (used by tests and deployments).
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Provider for NyaaProvider {
    async fn search(&self, query: &str) -> Result<Vec<TorrentSummary>, ProviderError> {
        let found: Vec<NyaaTorrent> = fetch_json(&self.client, &self.base_url, query).await?;
        Ok(found
            .into_iter()
            .map(|torrent| TorrentSummary {
                name: torrent.name,
                magnet: torrent.magnet,
                provider: PROVIDER_NAME.to_owned(),
                size: torrent.size,
                seeders: torrent.seeders,
                leechers: torrent.leechers,
                category: torrent.category,
                date_uploaded: torrent.date_uploaded,
                url: torrent.url,
            })
            .collect())
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
