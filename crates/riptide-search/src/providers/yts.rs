//! YTS movie index client.

use async_trait::async_trait;
use riptide_core::TorrentSummary;
use serde::Deserialize;

use super::fetch_json;
use crate::error::ProviderError;
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5362/api/yts";
const PROVIDER_NAME: &str = "YTS";

/// Client for the YTS scraper endpoint.
pub struct YtsProvider {
    client: reqwest::Client,
    base_url: String,
}

/// One movie as served by the YTS endpoint; each quality variant becomes its
/// own search result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct YtsMovie {
    name: String,
    #[serde(default)]
    released_date: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    files: Vec<YtsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct YtsFile {
    #[serde(default)]
    quality: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    torrent: String,
    #[serde(default)]
    magnet: String,
}

impl YtsProvider {
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
impl Provider for YtsProvider {
    async fn search(&self, query: &str) -> Result<Vec<TorrentSummary>, ProviderError> {
        let movies: Vec<YtsMovie> = fetch_json(&self.client, &self.base_url, query).await?;
        let torrents = movies
            .into_iter()
            .flat_map(|movie| {
                let name = movie.name;
                let released = movie.released_date;
                let genre = movie.genre;
                let url = movie.url;
                movie.files.into_iter().map(move |file| TorrentSummary {
                    name: format!("{name} ({released}) [{}]", file.quality),
                    magnet: file.magnet,
                    provider: PROVIDER_NAME.to_owned(),
                    size: file.size,
                    // The YTS endpoint carries no swarm counts.
                    seeders: "N/A".to_owned(),
                    leechers: "N/A".to_owned(),
                    category: genre.clone(),
                    date_uploaded: released.clone(),
                    url: if file.torrent.is_empty() {
                        url.clone()
                    } else {
                        file.torrent
                    },
                })
            })
            .collect();
        Ok(torrents)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
