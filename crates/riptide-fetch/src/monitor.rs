//! Per-download monitor task.
//!
//! One task per active download samples engine statistics on a fixed
//! interval and overwrites the durable record. Writes are atomic per tick;
//! cancellation is observed within one interval, so the task never exits
//! mid-write.

use std::sync::Arc;
use std::time::Duration;

use riptide_core::DownloadState;
use riptide_data::{DownloadStore, ProgressUpdate};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::active::{ActiveDownload, LiveCounters};
use crate::manager::Registry;

pub(crate) fn spawn(
    download: Arc<ActiveDownload>,
    store: DownloadStore,
    registry: Arc<Registry>,
    interval: Duration,
) -> JoinHandle<()> {
    let cancel = download.cancel.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(info_hash = %download.info_hash, "monitor task canceled");
                    break;
                }
                _ = ticker.tick() => {
                    match tick(&download, &store).await {
                        TickOutcome::Continue => {}
                        TickOutcome::Completed => {
                            registry.remove(&download.magnet);
                            info!(
                                info_hash = %download.info_hash,
                                name = %download.name,
                                "download completed"
                            );
                            break;
                        }
                    }
                }
            }
        }
    })
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Completed,
}

/// One reconciliation pass: sample the engine, fold the sample into the live
/// counters, persist them, and detect the terminal transition.
pub(crate) async fn tick(download: &ActiveDownload, store: &DownloadStore) -> TickOutcome {
    let stats = match download.handle.stats().await {
        Ok(stats) => stats,
        Err(err) => {
            warn!(
                error = %err,
                info_hash = %download.info_hash,
                "failed to sample engine statistics"
            );
            return TickOutcome::Continue;
        }
    };

    let total_bytes = download.total_bytes;
    let counters = download
        .update_live(|live| {
            // Progress never regresses while downloading, whatever the
            // engine reports for a single sample.
            let sampled = if live.status == DownloadState::Downloading {
                stats.bytes_downloaded.max(live.downloaded_bytes)
            } else {
                stats.bytes_downloaded
            };
            live.downloaded_bytes = sampled;
            live.download_bps = stats.download_bps;
            live.upload_bps = stats.upload_bps;
            live.peers_connected = stats.peers_connected;
            live.seeders = stats.seeders;
            live.leechers = stats.leechers;
            if total_bytes > 0 {
                live.progress = riptide_core::TransferStats {
                    bytes_downloaded: sampled,
                    ..stats
                }
                .percent_complete(total_bytes);
            }
            if total_bytes > 0 && sampled >= total_bytes {
                live.status = DownloadState::Completed;
                live.progress = 100.0;
            }
        })
        .await;

    let update = progress_update(&counters);
    if let Err(err) = store.update_progress(download.id, &update).await {
        // The in-memory state stays authoritative until the next
        // successful write.
        warn!(
            error = %err,
            info_hash = %download.info_hash,
            "failed to persist download progress"
        );
    }

    if counters.status == DownloadState::Completed {
        let file_count = i64::try_from(download.file_count).unwrap_or(i64::MAX);
        if let Err(err) = store.mark_completed(download.id, file_count).await {
            warn!(
                error = %err,
                info_hash = %download.info_hash,
                "failed to record download completion"
            );
        }
        return TickOutcome::Completed;
    }
    TickOutcome::Continue
}

fn progress_update(counters: &LiveCounters) -> ProgressUpdate {
    ProgressUpdate {
        status: counters.status,
        progress: counters.progress,
        downloaded_bytes: clamp_i64(counters.downloaded_bytes),
        download_bps: clamp_i64(counters.download_bps),
        upload_bps: clamp_i64(counters.upload_bps),
        peers_connected: i64::from(counters.peers_connected),
        seeders: i64::from(counters.seeders),
        leechers: i64::from(counters.leechers),
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
