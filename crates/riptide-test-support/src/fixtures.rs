//! Builders for common test inputs.

use riptide_core::TorrentSummary;
use riptide_data::DownloadStore;

/// Open a migrated in-memory download store.
///
/// # Panics
///
/// Panics if the in-memory database cannot be opened; tests cannot proceed
/// without it.
pub async fn memory_store() -> DownloadStore {
    DownloadStore::connect_in_memory()
        .await
        .expect("in-memory store")
}

/// Build a magnet URI with the given btih hash and display name.
#[must_use]
pub fn magnet_for(hash: &str, name: &str) -> String {
    format!("magnet:?xt=urn:btih:{hash}&dn={name}")
}

/// Build a search-result summary pointing at the given magnet URI.
#[must_use]
pub fn summary(name: &str, magnet: &str, provider: &str) -> TorrentSummary {
    TorrentSummary {
        name: name.to_owned(),
        magnet: magnet.to_owned(),
        provider: provider.to_owned(),
        size: "1.4 GB".to_owned(),
        seeders: "120".to_owned(),
        leechers: "14".to_owned(),
        category: "Movies".to_owned(),
        date_uploaded: "2024-11-02".to_owned(),
        url: "https://example.invalid/torrent/1".to_owned(),
    }
}
