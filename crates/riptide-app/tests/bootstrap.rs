use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use riptide_app::bootstrap::bootstrap;
use riptide_app::config::AppConfig;
use riptide_core::{DownloadState, InfoHash, TorrentSummary};
use riptide_engine::SimProfile;

const HASH: &str = "c12fe1c06bde254f72ab59b87c5f0288a6b95a20";

fn test_config(root: &Path, rate_bps: u64) -> AppConfig {
    let mut config = AppConfig::resolve(Some(root.join("data")), None);
    config.engine = SimProfile {
        default_total_bytes: 1_000,
        rate_bps,
        file_count: 1,
    };
    config.fetch.monitor_interval = Duration::from_millis(100);
    config
}

fn demo_torrent() -> TorrentSummary {
    TorrentSummary {
        name: "demo".to_owned(),
        magnet: format!("magnet:?xt=urn:btih:{HASH}&dn=demo&xl=1000"),
        provider: "manual".to_owned(),
        ..TorrentSummary::default()
    }
}

#[tokio::test]
async fn bootstrap_creates_directories_and_database() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let config = test_config(temp.path(), 1_000);
    let app = bootstrap(config).await?;

    assert!(app.config.data_dir.is_dir());
    assert!(app.config.fetch.download_dir.is_dir());
    assert!(app.config.database_path.is_file());
    assert!(app.store.get_unfinished().await?.is_empty());
    assert_eq!(
        app.store.get_setting("download_dir").await?,
        Some(app.config.fetch.download_dir.display().to_string())
    );
    Ok(())
}

#[tokio::test]
async fn download_completes_through_the_simulated_engine() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let app = bootstrap(test_config(temp.path(), 4_000)).await?;

    app.manager.start_download(&demo_torrent(), Vec::new()).await?;

    let hash = InfoHash::new(HASH);
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Ok(Some(record)) = app.store.get_by_hash(&hash).await
                && record.status == DownloadState::Completed
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("download did not complete in time");

    let history = app.store.history(5).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].info_hash, hash);
    assert!(app.manager.active_downloads().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn recovery_resumes_after_a_restart() -> Result<()> {
    let temp = tempfile::tempdir()?;

    // First process: start a slow download, then shut down mid-flight.
    let first = bootstrap(test_config(temp.path(), 1)).await?;
    first.manager.start_download(&demo_torrent(), Vec::new()).await?;
    first.manager.shutdown().await;
    drop(first);

    // Second process: the store alone drives recovery.
    let second = bootstrap(test_config(temp.path(), 1)).await?;
    let report = second.recover().await?;
    assert_eq!(report.resumed, vec![InfoHash::new(HASH)]);
    assert!(report.skipped.is_empty());

    let active = second.manager.active_downloads().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, DownloadState::Downloading);
    Ok(())
}
