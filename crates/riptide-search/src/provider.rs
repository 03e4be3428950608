//! The provider seam: one implementation per torrent-indexing backend.

use async_trait::async_trait;
use riptide_core::TorrentSummary;

use crate::error::ProviderError;

/// A torrent-indexing backend. Any implementation is acceptable as long as
/// it returns within the aggregator's shared deadline or tolerates being
/// preempted by it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a search against the backend.
    async fn search(&self, query: &str) -> Result<Vec<TorrentSummary>, ProviderError>;

    /// Stable display name for the backend.
    fn name(&self) -> &str;
}

/// One provider's contribution to an aggregated search.
#[derive(Debug)]
pub struct ProviderResult {
    /// Provider display name.
    pub provider: String,
    /// The results, or why this provider produced none.
    pub torrents: Result<Vec<TorrentSummary>, ProviderError>,
}
