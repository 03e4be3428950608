//! In-memory projection of one tracked download.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use riptide_core::{DownloadId, DownloadState, InfoHash, TransferHandle};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Live projection of a durable record plus its engine handle and the
/// cancellation control for its monitor task. Owned exclusively by the
/// orchestrator; mutable counters sit behind their own lock so unrelated
/// downloads' monitor ticks never serialize behind registry operations.
pub(crate) struct ActiveDownload {
    pub(crate) id: DownloadId,
    pub(crate) info_hash: InfoHash,
    pub(crate) name: String,
    pub(crate) magnet: String,
    pub(crate) provider: String,
    pub(crate) total_bytes: u64,
    pub(crate) file_count: usize,
    pub(crate) selected_files: Vec<u32>,
    pub(crate) download_path: PathBuf,
    pub(crate) handle: Arc<dyn TransferHandle>,
    pub(crate) cancel: CancellationToken,
    monitor: Mutex<Option<JoinHandle<()>>>,
    live: RwLock<LiveCounters>,
}

/// Mutable per-tick counters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LiveCounters {
    pub(crate) status: DownloadState,
    pub(crate) progress: f64,
    pub(crate) downloaded_bytes: u64,
    pub(crate) download_bps: u64,
    pub(crate) upload_bps: u64,
    pub(crate) peers_connected: u32,
    pub(crate) seeders: u32,
    pub(crate) leechers: u32,
}

impl LiveCounters {
    /// Fresh counters for a newly started download.
    pub(crate) const fn starting() -> Self {
        Self {
            status: DownloadState::Downloading,
            progress: 0.0,
            downloaded_bytes: 0,
            download_bps: 0,
            upload_bps: 0,
            peers_connected: 0,
            seeders: 0,
            leechers: 0,
        }
    }
}

/// Everything needed to construct an [`ActiveDownload`].
pub(crate) struct ActiveSeed {
    pub(crate) id: DownloadId,
    pub(crate) info_hash: InfoHash,
    pub(crate) name: String,
    pub(crate) magnet: String,
    pub(crate) provider: String,
    pub(crate) total_bytes: u64,
    pub(crate) file_count: usize,
    pub(crate) selected_files: Vec<u32>,
    pub(crate) download_path: PathBuf,
    pub(crate) handle: Arc<dyn TransferHandle>,
    pub(crate) initial: LiveCounters,
}

impl ActiveDownload {
    pub(crate) fn new(seed: ActiveSeed) -> Self {
        Self {
            id: seed.id,
            info_hash: seed.info_hash,
            name: seed.name,
            magnet: seed.magnet,
            provider: seed.provider,
            total_bytes: seed.total_bytes,
            file_count: seed.file_count,
            selected_files: seed.selected_files,
            download_path: seed.download_path,
            handle: seed.handle,
            cancel: CancellationToken::new(),
            monitor: Mutex::new(None),
            live: RwLock::new(seed.initial),
        }
    }

    /// Record the spawned monitor task so removal and shutdown can await it.
    pub(crate) fn attach_monitor(&self, task: JoinHandle<()>) {
        *self.monitor.lock().expect("monitor slot poisoned") = Some(task);
    }

    pub(crate) fn take_monitor(&self) -> Option<JoinHandle<()>> {
        self.monitor.lock().expect("monitor slot poisoned").take()
    }

    /// Mutate the live counters under the per-record lock, returning a copy.
    pub(crate) async fn update_live(&self, mutate: impl FnOnce(&mut LiveCounters)) -> LiveCounters {
        let mut live = self.live.write().await;
        mutate(&mut live);
        *live
    }

    pub(crate) async fn set_status(&self, status: DownloadState) {
        self.live.write().await.status = status;
    }

    /// Owned copy of the current state; callers never see live references.
    pub(crate) async fn snapshot(&self) -> DownloadSnapshot {
        let live = *self.live.read().await;
        DownloadSnapshot {
            id: self.id,
            info_hash: self.info_hash.clone(),
            name: self.name.clone(),
            magnet: self.magnet.clone(),
            provider: self.provider.clone(),
            total_bytes: self.total_bytes,
            file_count: self.file_count,
            selected_files: self.selected_files.clone(),
            download_path: self.download_path.clone(),
            status: live.status,
            progress: live.progress,
            downloaded_bytes: live.downloaded_bytes,
            download_bps: live.download_bps,
            upload_bps: live.upload_bps,
            peers_connected: live.peers_connected,
            seeders: live.seeders,
            leechers: live.leechers,
        }
    }
}

/// Owned copy of one tracked download's state, safe to hand to callers.
#[derive(Debug, Clone)]
pub struct DownloadSnapshot {
    /// Durable record id.
    pub id: DownloadId,
    /// Torrent identity hash.
    pub info_hash: InfoHash,
    /// Display name.
    pub name: String,
    /// Magnet URI the download was started from.
    pub magnet: String,
    /// Originating provider name.
    pub provider: String,
    /// Total payload size in bytes.
    pub total_bytes: u64,
    /// Number of files in the payload.
    pub file_count: usize,
    /// Selected file indices; empty means everything.
    pub selected_files: Vec<u32>,
    /// Destination path on disk.
    pub download_path: PathBuf,
    /// Lifecycle status at snapshot time.
    pub status: DownloadState,
    /// Completion percentage (0-100).
    pub progress: f64,
    /// Bytes fetched so far.
    pub downloaded_bytes: u64,
    /// Current download rate in bytes per second.
    pub download_bps: u64,
    /// Current upload rate in bytes per second.
    pub upload_bps: u64,
    /// Peers currently connected.
    pub peers_connected: u32,
    /// Seeders visible in the swarm.
    pub seeders: u32,
    /// Leechers visible in the swarm.
    pub leechers: u32,
}
