//! Built-in provider clients.
//!
//! Each backend is a thin JSON-over-HTTP client in front of a scraper
//! service; base URLs are configurable so deployments (and tests) can point
//! them anywhere.

mod nyaa;
mod piratebay;
mod yts;

pub use nyaa::NyaaProvider;
pub use piratebay::PirateBayProvider;
pub use yts::YtsProvider;

use crate::error::ProviderError;

pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<T, ProviderError> {
    let url = format!("{base_url}/{}", urlencoding::encode(query));
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status { status });
    }
    Ok(response.json().await?)
}
