//! Service wiring: store, engine, orchestrator, and search client.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use riptide_core::TransferEngine;
use riptide_data::DownloadStore;
use riptide_engine::MagnetEngine;
use riptide_fetch::{DownloadManager, RecoveryReport};
use riptide_search::providers::{NyaaProvider, PirateBayProvider, YtsProvider};
use riptide_search::{Provider, SearchClient};
use tracing::info;

use crate::config::AppConfig;

const PROVIDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The wired application services.
pub struct App {
    /// Resolved configuration.
    pub config: AppConfig,
    /// Shared persistent store.
    pub store: DownloadStore,
    /// Download orchestrator.
    pub manager: Arc<DownloadManager>,
    /// Aggregated search client.
    pub search: SearchClient,
}

/// Wire the services together: directories, store, engine, orchestrator,
/// and search providers.
///
/// # Errors
///
/// Returns an error when directories cannot be created or the database
/// cannot be opened.
pub async fn bootstrap(config: AppConfig) -> Result<App> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;
    fs::create_dir_all(&config.fetch.download_dir).with_context(|| {
        format!(
            "failed to create download directory {}",
            config.fetch.download_dir.display()
        )
    })?;

    let store = DownloadStore::connect(&config.database_path)
        .await
        .context("failed to open the download store")?;
    store
        .set_setting(
            "download_dir",
            &config.fetch.download_dir.display().to_string(),
        )
        .await
        .context("failed to record the download directory")?;

    // The simulated session stands in until a native engine session lands.
    let engine: Arc<dyn TransferEngine> =
        Arc::new(MagnetEngine::simulated(config.engine.clone()));
    let manager = Arc::new(DownloadManager::new(
        engine,
        store.clone(),
        config.fetch.clone(),
    ));
    let search = build_search(&config)?;

    Ok(App {
        config,
        store,
        manager,
        search,
    })
}

fn build_search(config: &AppConfig) -> Result<SearchClient> {
    let client = reqwest::Client::builder()
        .timeout(PROVIDER_REQUEST_TIMEOUT)
        .build()
        .context("failed to build the provider http client")?;

    let yts = match &config.yts_base_url {
        Some(base) => YtsProvider::with_base_url(client.clone(), base.clone()),
        None => YtsProvider::new(client.clone()),
    };
    let piratebay = match &config.piratebay_base_url {
        Some(base) => PirateBayProvider::with_base_url(client.clone(), base.clone()),
        None => PirateBayProvider::new(client.clone()),
    };
    let nyaa = match &config.nyaa_base_url {
        Some(base) => NyaaProvider::with_base_url(client.clone(), base.clone()),
        None => NyaaProvider::new(client),
    };

    let providers: Vec<Arc<dyn Provider>> =
        vec![Arc::new(piratebay), Arc::new(yts), Arc::new(nyaa)];
    Ok(SearchClient::with_providers(
        providers,
        config.search_timeout,
    ))
}

impl App {
    /// Run the startup recovery pass and log its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error only when the record list cannot be read.
    pub async fn recover(&self) -> Result<RecoveryReport> {
        let report = self.manager.recover().await?;
        info!(
            resumed = report.resumed.len(),
            skipped = report.skipped.len(),
            "download recovery finished"
        );
        Ok(report)
    }
}
