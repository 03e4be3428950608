//! Aggregation over every registered provider with one shared deadline.

use std::sync::Arc;
use std::time::Duration;

use riptide_core::TorrentSummary;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::{Provider, ProviderResult};

/// Fans queries out to every registered provider in parallel.
pub struct SearchClient {
    providers: Vec<Arc<dyn Provider>>,
    timeout: Duration,
}

impl SearchClient {
    /// Construct a client with no providers registered yet.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Construct a client over a fixed provider set.
    #[must_use]
    pub fn with_providers(providers: Vec<Arc<dyn Provider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Register another provider.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    /// Query every provider concurrently.
    ///
    /// All provider tasks race one shared deadline: the aggregate latency is
    /// bounded by the configured timeout, not by the sum of provider
    /// latencies. A provider that misses the deadline yields a
    /// [`ProviderError::Timeout`] result; failures never affect the other
    /// providers. Results come back in registration order, one per provider.
    pub async fn search_all(&self, query: &str) -> Vec<ProviderResult> {
        let deadline = Instant::now() + self.timeout;
        let tasks: Vec<_> = self
            .providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let query = query.to_owned();
                tokio::spawn(async move {
                    let torrents =
                        match tokio::time::timeout_at(deadline, provider.search(&query)).await {
                            Ok(result) => result,
                            Err(_) => Err(ProviderError::Timeout),
                        };
                    ProviderResult {
                        provider: provider.name().to_owned(),
                        torrents,
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for (task, provider) in tasks.into_iter().zip(&self.providers) {
            match task.await {
                Ok(result) => results.push(result),
                Err(err) => results.push(ProviderResult {
                    provider: provider.name().to_owned(),
                    torrents: Err(ProviderError::Task {
                        reason: err.to_string(),
                    }),
                }),
            }
        }
        results
    }

    /// Flatten the successful provider results into one list, stamping each
    /// entry with its provider's name.
    pub async fn all_torrents(&self, query: &str) -> Vec<TorrentSummary> {
        let mut torrents = Vec::new();
        for result in self.search_all(query).await {
            match result.torrents {
                Ok(found) => {
                    for mut torrent in found {
                        torrent.provider.clone_from(&result.provider);
                        torrents.push(torrent);
                    }
                }
                Err(err) => {
                    debug!(provider = %result.provider, error = %err, "provider produced no results");
                }
            }
        }
        torrents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::sleep;

    struct InstantProvider {
        name: &'static str,
        results: usize,
    }

    #[async_trait]
    impl Provider for InstantProvider {
        async fn search(&self, query: &str) -> Result<Vec<TorrentSummary>, ProviderError> {
            Ok((0..self.results)
                .map(|index| TorrentSummary {
                    name: format!("{query}-{index}"),
                    magnet: format!("magnet:?xt=urn:btih:{index:040x}"),
                    ..TorrentSummary::default()
                })
                .collect())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct HungProvider;

    #[async_trait]
    impl Provider for HungProvider {
        async fn search(&self, _query: &str) -> Result<Vec<TorrentSummary>, ProviderError> {
            sleep(Duration::from_secs(3_600)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "Hung"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        async fn search(&self, _query: &str) -> Result<Vec<TorrentSummary>, ProviderError> {
            Err(ProviderError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
            })
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out_without_hiding_the_others() {
        let client = SearchClient::with_providers(
            vec![
                Arc::new(InstantProvider {
                    name: "YTS",
                    results: 2,
                }),
                Arc::new(HungProvider),
                Arc::new(InstantProvider {
                    name: "NyaaSi",
                    results: 1,
                }),
            ],
            Duration::from_secs(15),
        );

        let started = Instant::now();
        let results = client.search_all("dune").await;
        assert!(
            started.elapsed() < Duration::from_secs(16),
            "aggregate latency is bounded by the shared timeout"
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].provider, "YTS");
        assert_eq!(results[0].torrents.as_ref().unwrap().len(), 2);
        assert!(matches!(
            results[1].torrents,
            Err(ProviderError::Timeout)
        ));
        assert_eq!(results[2].provider, "NyaaSi");
        assert_eq!(results[2].torrents.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_isolated() {
        let client = SearchClient::with_providers(
            vec![
                Arc::new(FailingProvider),
                Arc::new(InstantProvider {
                    name: "YTS",
                    results: 3,
                }),
            ],
            Duration::from_secs(15),
        );

        let results = client.search_all("arrival").await;
        assert!(matches!(
            results[0].torrents,
            Err(ProviderError::Status { .. })
        ));
        assert_eq!(results[1].torrents.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn all_torrents_flattens_and_stamps_the_provider() {
        let client = SearchClient::with_providers(
            vec![
                Arc::new(InstantProvider {
                    name: "YTS",
                    results: 2,
                }),
                Arc::new(FailingProvider),
                Arc::new(InstantProvider {
                    name: "NyaaSi",
                    results: 1,
                }),
            ],
            Duration::from_secs(15),
        );

        let torrents = client.all_torrents("blade runner").await;
        assert_eq!(torrents.len(), 3);
        assert_eq!(torrents[0].provider, "YTS");
        assert_eq!(torrents[2].provider, "NyaaSi");
    }

    #[tokio::test]
    async fn empty_provider_set_yields_no_results() {
        let client = SearchClient::new(Duration::from_secs(1));
        assert!(client.search_all("anything").await.is_empty());
    }
}
