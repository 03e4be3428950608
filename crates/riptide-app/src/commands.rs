//! Command implementations behind the CLI surface.

use std::time::Duration;

use anyhow::{Context, Result};
use riptide_core::{DownloadState, TorrentSummary};
use riptide_engine::parse_magnet;
use tracing::info;

use crate::bootstrap::App;

pub(crate) async fn run(app: &App) -> Result<()> {
    app.recover().await?;
    info!("riptide is running; press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for the shutdown signal")?;
    app.manager.shutdown().await;
    Ok(())
}

pub(crate) async fn search(app: &App, query: &str) -> Result<()> {
    for result in app.search.search_all(query).await {
        match result.torrents {
            Ok(torrents) => {
                println!("{}: {} result(s)", result.provider, torrents.len());
                for torrent in torrents {
                    println!(
                        "  {:>10}  S:{:>6} L:{:>6}  {}",
                        torrent.size, torrent.seeders, torrent.leechers, torrent.name
                    );
                }
            }
            Err(err) => println!("{}: failed ({err})", result.provider),
        }
    }
    Ok(())
}

pub(crate) async fn add(
    app: &App,
    magnet: &str,
    name: Option<String>,
    files: Vec<u32>,
) -> Result<()> {
    let parsed = parse_magnet(magnet).context("invalid magnet URI")?;
    let display_name = name.or(parsed.display_name).unwrap_or_else(|| {
        let hash = parsed.info_hash.as_str();
        format!("transfer-{}", &hash[..hash.len().min(8)])
    });

    let torrent = TorrentSummary {
        name: display_name,
        magnet: magnet.to_owned(),
        provider: "manual".to_owned(),
        ..TorrentSummary::default()
    };
    app.manager.start_download(&torrent, files).await?;

    let hash = parsed.info_hash;
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        match app.manager.download_by_hash(&hash).await {
            Some(snapshot) => {
                println!(
                    "{:>6.1}%  {} / {} bytes  peers {}",
                    snapshot.progress,
                    snapshot.downloaded_bytes,
                    snapshot.total_bytes,
                    snapshot.peers_connected
                );
            }
            // The live entry disappears at the terminal transition.
            None => {
                match app.store.get_by_hash(&hash).await? {
                    Some(record) if record.status == DownloadState::Completed => {
                        println!("completed: {}", record.download_path);
                    }
                    Some(record) => {
                        println!("download stopped (status: {})", record.status.as_str());
                    }
                    None => println!("download was removed"),
                }
                return Ok(());
            }
        }
    }
}

pub(crate) async fn status(app: &App) -> Result<()> {
    let records = app.store.get_unfinished().await?;
    if records.is_empty() {
        println!("no tracked downloads");
        return Ok(());
    }
    for record in records {
        println!(
            "{:<12} {:>6.1}%  {:>12} bytes  {}",
            record.status.as_str(),
            record.progress,
            record.downloaded_bytes,
            record.name
        );
    }
    Ok(())
}

pub(crate) async fn history(app: &App, limit: i64) -> Result<()> {
    let completed = app.manager.history(limit).await?;
    if completed.is_empty() {
        println!("no completed downloads yet");
        return Ok(());
    }
    for entry in completed {
        println!(
            "{}  {:>12} bytes  {} file(s)  {}",
            entry.completed_at.format("%Y-%m-%d %H:%M"),
            entry.total_bytes,
            entry.file_count,
            entry.name
        );
    }
    Ok(())
}
