//! The download manager: start/pause/resume/remove, snapshot reads, and
//! startup recovery against the shared transfer engine.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use riptide_core::{
    DownloadId, DownloadState, FileEntry, FilePriority, FilePriorityOverride, InfoHash,
    TorrentSummary, TransferEngine, TransferHandle,
};
use riptide_data::{DownloadRecord, DownloadStore, NewDownload};
use tracing::{debug, info, warn};

use crate::active::{ActiveDownload, ActiveSeed, DownloadSnapshot, LiveCounters};
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::monitor;

/// Orchestrates every tracked download against one shared engine instance.
pub struct DownloadManager {
    engine: Arc<dyn TransferEngine>,
    store: DownloadStore,
    registry: Arc<Registry>,
    config: FetchConfig,
}

/// Outcome of a recovery pass: every unfinished record either resumed or was
/// skipped with a logged reason — none are silently dropped.
#[derive(Debug, Clone, Default)]
pub struct RecoveryReport {
    /// Identity hashes of records resumed with a live monitor task.
    pub resumed: Vec<InfoHash>,
    /// Identity hashes of records left at rest for a later manual start.
    pub skipped: Vec<InfoHash>,
}

impl DownloadManager {
    /// Construct a manager over the shared engine and store.
    #[must_use]
    pub fn new(engine: Arc<dyn TransferEngine>, store: DownloadStore, config: FetchConfig) -> Self {
        Self {
            engine,
            store,
            registry: Arc::new(Registry::default()),
            config,
        }
    }

    /// Register a new download and spawn its monitor task.
    ///
    /// Blocks until engine metadata resolves or the configured bounded wait
    /// elapses. An empty `selected_files` means the whole payload.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` when the magnet already maps to a tracked download;
    /// `MetadataTimeout`, `Engine`, or `Persistence` when admission fails —
    /// in every failure case the claim on the magnet is released so the
    /// start can be retried.
    pub async fn start_download(
        &self,
        torrent: &TorrentSummary,
        selected_files: Vec<u32>,
    ) -> FetchResult<DownloadId> {
        self.registry.claim(&torrent.magnet)?;
        match self.admit(torrent, selected_files).await {
            Ok(id) => Ok(id),
            Err(err) => {
                self.registry.release(&torrent.magnet);
                Err(err)
            }
        }
    }

    async fn admit(
        &self,
        torrent: &TorrentSummary,
        selected_files: Vec<u32>,
    ) -> FetchResult<DownloadId> {
        let handle = self.engine.add(&torrent.magnet).await?;
        if let Err(err) = handle.await_metadata(self.config.metadata_timeout).await {
            if let Err(forget_err) = handle.forget().await {
                debug!(
                    error = %forget_err,
                    "failed to drop transfer after metadata wait failure"
                );
            }
            return Err(err.into());
        }

        let info_hash = handle.identity().await?;
        let total_bytes = handle.total_bytes().await?;
        let files = handle.files().await?;
        apply_selection(handle.as_ref(), &files, &selected_files).await?;

        let download_path = self.config.download_dir.join(&torrent.name);
        let id = self
            .store
            .insert_download(&NewDownload {
                info_hash: info_hash.clone(),
                name: torrent.name.clone(),
                magnet: torrent.magnet.clone(),
                provider: torrent.provider.clone(),
                total_bytes: i64::try_from(total_bytes).unwrap_or(i64::MAX),
                download_path: download_path.display().to_string(),
                selected_files: selected_files.clone(),
            })
            .await?;

        handle.start().await?;
        self.store
            .update_status(id, DownloadState::Downloading)
            .await?;

        let download = Arc::new(ActiveDownload::new(ActiveSeed {
            id,
            info_hash,
            name: torrent.name.clone(),
            magnet: torrent.magnet.clone(),
            provider: torrent.provider.clone(),
            total_bytes,
            file_count: files.len(),
            selected_files,
            download_path,
            handle,
            initial: LiveCounters::starting(),
        }));
        self.track(Arc::clone(&download));
        info!(
            info_hash = %download.info_hash,
            name = %download.name,
            "download started"
        );
        Ok(id)
    }

    /// Pause an active download: stop the engine transfer and persist the
    /// status change.
    ///
    /// # Errors
    ///
    /// `NotFound` when no active download matches the magnet.
    pub async fn pause(&self, magnet: &str) -> FetchResult<()> {
        let download = self.registry.get(magnet).ok_or(FetchError::NotFound)?;
        download.handle.stop().await?;
        download.set_status(DownloadState::Paused).await;
        self.store
            .update_status(download.id, DownloadState::Paused)
            .await?;
        info!(info_hash = %download.info_hash, "download paused");
        Ok(())
    }

    /// Resume a paused download.
    ///
    /// # Errors
    ///
    /// `NotFound` when no active download matches the magnet.
    pub async fn resume(&self, magnet: &str) -> FetchResult<()> {
        let download = self.registry.get(magnet).ok_or(FetchError::NotFound)?;
        download.handle.start().await?;
        download.set_status(DownloadState::Downloading).await;
        self.store
            .update_status(download.id, DownloadState::Downloading)
            .await?;
        info!(info_hash = %download.info_hash, "download resumed");
        Ok(())
    }

    /// Remove a download: cancel its monitor task, drop the engine transfer,
    /// delete the durable record, and optionally delete the payload.
    ///
    /// Data deletion is best-effort: a filesystem failure is logged, never
    /// propagated, since the engine and registry state are already gone.
    ///
    /// # Errors
    ///
    /// `NotFound` when no active download matches the magnet; `Persistence`
    /// when the record delete fails.
    pub async fn remove(&self, magnet: &str, delete_data: bool) -> FetchResult<()> {
        let download = self.registry.get(magnet).ok_or(FetchError::NotFound)?;
        download.cancel.cancel();
        if let Some(task) = download.take_monitor() {
            let _ = task.await;
        }
        if let Err(err) = download.handle.forget().await {
            warn!(
                error = %err,
                info_hash = %download.info_hash,
                "engine refused to drop transfer during removal"
            );
        }
        self.registry.remove(magnet);
        self.store.delete_download(download.id).await?;
        if delete_data {
            remove_data(&download.download_path).await;
        }
        info!(info_hash = %download.info_hash, "download removed");
        Ok(())
    }

    /// Resume every `pending`/`downloading` record from the store.
    ///
    /// The store is the source of truth for what should be running; the
    /// engine holds no memory of past sessions. A record that fails to
    /// re-admit is logged and skipped — never fatal to the rest. Paused
    /// records stay at rest.
    ///
    /// # Errors
    ///
    /// Only a failure to read the record list aborts recovery.
    pub async fn recover(&self) -> FetchResult<RecoveryReport> {
        let records = self.store.get_unfinished().await?;
        let mut report = RecoveryReport::default();
        for record in records {
            if !matches!(
                record.status,
                DownloadState::Pending | DownloadState::Downloading
            ) {
                continue;
            }
            match self.resume_record(&record).await {
                Ok(()) => {
                    info!(
                        info_hash = %record.info_hash,
                        name = %record.name,
                        "download recovered"
                    );
                    report.resumed.push(record.info_hash.clone());
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        info_hash = %record.info_hash,
                        name = %record.name,
                        "skipping download during recovery"
                    );
                    report.skipped.push(record.info_hash.clone());
                }
            }
        }
        Ok(report)
    }

    async fn resume_record(&self, record: &DownloadRecord) -> FetchResult<()> {
        self.registry.claim(&record.magnet)?;
        match self.readmit(record).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.registry.release(&record.magnet);
                Err(err)
            }
        }
    }

    async fn readmit(&self, record: &DownloadRecord) -> FetchResult<()> {
        let handle = self.engine.add(&record.magnet).await?;
        if let Err(err) = handle
            .await_metadata(self.config.recover_metadata_timeout)
            .await
        {
            if let Err(forget_err) = handle.forget().await {
                debug!(
                    error = %forget_err,
                    "failed to drop transfer after metadata wait failure"
                );
            }
            return Err(err.into());
        }

        let files = handle.files().await?;
        apply_selection(handle.as_ref(), &files, &record.selected_files).await?;
        handle.start().await?;
        if record.status == DownloadState::Pending {
            self.store
                .update_status(record.id, DownloadState::Downloading)
                .await?;
        }

        let download = Arc::new(ActiveDownload::new(ActiveSeed {
            id: record.id,
            info_hash: record.info_hash.clone(),
            name: record.name.clone(),
            magnet: record.magnet.clone(),
            provider: record.provider.clone(),
            total_bytes: u64::try_from(record.total_bytes).unwrap_or_default(),
            file_count: files.len(),
            selected_files: record.selected_files.clone(),
            download_path: record.download_path.clone().into(),
            handle,
            initial: LiveCounters {
                status: DownloadState::Downloading,
                progress: record.progress,
                downloaded_bytes: u64::try_from(record.downloaded_bytes).unwrap_or_default(),
                ..LiveCounters::starting()
            },
        }));
        self.track(download);
        Ok(())
    }

    fn track(&self, download: Arc<ActiveDownload>) {
        self.registry.promote(Arc::clone(&download));
        let task = monitor::spawn(
            Arc::clone(&download),
            self.store.clone(),
            Arc::clone(&self.registry),
            self.config.monitor_interval,
        );
        download.attach_monitor(task);
    }

    /// Snapshot copies of every tracked download, sorted by name.
    pub async fn active_downloads(&self) -> Vec<DownloadSnapshot> {
        let entries = self.registry.entries();
        let mut snapshots = Vec::with_capacity(entries.len());
        for entry in entries {
            snapshots.push(entry.snapshot().await);
        }
        snapshots.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.0.cmp(&b.id.0)));
        snapshots
    }

    /// Snapshot copy of one tracked download by identity hash.
    pub async fn download_by_hash(&self, hash: &InfoHash) -> Option<DownloadSnapshot> {
        for entry in self.registry.entries() {
            if &entry.info_hash == hash {
                return Some(entry.snapshot().await);
            }
        }
        None
    }

    /// Completed-download history, newest first.
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error when the store read fails.
    pub async fn history(&self, limit: i64) -> FetchResult<Vec<riptide_data::CompletedDownload>> {
        Ok(self.store.history(limit).await?)
    }

    /// Cancel every monitor task and wait for them to exit. Durable records
    /// are left as-is for the next recovery pass.
    pub async fn shutdown(&self) {
        let entries = self.registry.entries();
        for entry in &entries {
            entry.cancel.cancel();
        }
        for entry in entries {
            if let Some(task) = entry.take_monitor() {
                let _ = task.await;
            }
        }
        info!("download manager shut down");
    }
}

async fn apply_selection(
    handle: &dyn TransferHandle,
    files: &[FileEntry],
    selected: &[u32],
) -> FetchResult<()> {
    // An empty selection means the whole payload at default priority.
    if selected.is_empty() {
        return Ok(());
    }
    let priorities: Vec<FilePriorityOverride> = files
        .iter()
        .map(|file| FilePriorityOverride {
            index: file.index,
            priority: if selected.contains(&file.index) {
                FilePriority::Normal
            } else {
                FilePriority::Skip
            },
        })
        .collect();
    handle.set_priorities(&priorities).await?;
    Ok(())
}

async fn remove_data(path: &Path) {
    let result = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        warn!(
            error = %err,
            path = %path.display(),
            "failed to delete download data"
        );
    }
}

/// Live map of tracked downloads plus the in-flight claims that close the
/// duplicate-start race. One coarse lock guards the structure; counter
/// mutation happens under each entry's own lock.
#[derive(Default)]
pub(crate) struct Registry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    active: HashMap<String, Arc<ActiveDownload>>,
    claimed: HashSet<String>,
}

impl Registry {
    /// Reserve a magnet for admission. Fails when it is already tracked or
    /// another start is in flight.
    fn claim(&self, magnet: &str) -> FetchResult<()> {
        let mut inner = self.lock();
        if inner.active.contains_key(magnet) {
            return Err(FetchError::AlreadyActive {
                magnet: magnet.to_owned(),
            });
        }
        if !inner.claimed.insert(magnet.to_owned()) {
            return Err(FetchError::AlreadyActive {
                magnet: magnet.to_owned(),
            });
        }
        Ok(())
    }

    fn release(&self, magnet: &str) {
        self.lock().claimed.remove(magnet);
    }

    /// Swap an admission claim for a live entry.
    fn promote(&self, download: Arc<ActiveDownload>) {
        let mut inner = self.lock();
        inner.claimed.remove(&download.magnet);
        inner.active.insert(download.magnet.clone(), download);
    }

    fn get(&self, magnet: &str) -> Option<Arc<ActiveDownload>> {
        self.lock().active.get(magnet).cloned()
    }

    pub(crate) fn remove(&self, magnet: &str) -> Option<Arc<ActiveDownload>> {
        self.lock().active.remove(magnet)
    }

    fn entries(&self) -> Vec<Arc<ActiveDownload>> {
        self.lock().active.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().expect("registry lock poisoned")
    }
}
