//! Durable record types mapped to and from the SQLite tables.

use chrono::{DateTime, Utc};
use riptide_core::{DownloadId, DownloadState, InfoHash};

/// One row of the `downloads` table: a download's identity, lifecycle
/// status, and last-persisted progress counters.
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    /// Row identifier.
    pub id: DownloadId,
    /// Torrent identity hash (unique).
    pub info_hash: InfoHash,
    /// Display name shown to the user.
    pub name: String,
    /// Magnet URI the transfer was added from.
    pub magnet: String,
    /// Name of the provider the result came from.
    pub provider: String,
    /// Total payload size in bytes.
    pub total_bytes: i64,
    /// Lifecycle status.
    pub status: DownloadState,
    /// Completion percentage (0-100).
    pub progress: f64,
    /// Bytes fetched at the last monitor tick.
    pub downloaded_bytes: i64,
    /// Last-known download rate in bytes per second.
    pub download_bps: i64,
    /// Last-known upload rate in bytes per second.
    pub upload_bps: i64,
    /// Peers connected at the last tick.
    pub peers_connected: i64,
    /// Seeders visible at the last tick.
    pub seeders: i64,
    /// Leechers visible at the last tick.
    pub leechers: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
    /// When the download completed, if it has.
    pub completed_at: Option<DateTime<Utc>>,
    /// Destination path on disk.
    pub download_path: String,
    /// Ordered indices of the selected files; empty means everything.
    pub selected_files: Vec<u32>,
}

/// Payload for inserting a fresh download record (status starts `pending`).
#[derive(Debug, Clone)]
pub struct NewDownload {
    /// Torrent identity hash.
    pub info_hash: InfoHash,
    /// Display name.
    pub name: String,
    /// Magnet URI.
    pub magnet: String,
    /// Originating provider name.
    pub provider: String,
    /// Total payload size in bytes.
    pub total_bytes: i64,
    /// Destination path on disk.
    pub download_path: String,
    /// Ordered indices of the selected files; empty means everything.
    pub selected_files: Vec<u32>,
}

/// Per-tick counter overwrite produced by a download's monitor task.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    /// Lifecycle status at this tick.
    pub status: DownloadState,
    /// Completion percentage (0-100).
    pub progress: f64,
    /// Bytes fetched so far.
    pub downloaded_bytes: i64,
    /// Current download rate in bytes per second.
    pub download_bps: i64,
    /// Current upload rate in bytes per second.
    pub upload_bps: i64,
    /// Peers currently connected.
    pub peers_connected: i64,
    /// Seeders visible in the swarm.
    pub seeders: i64,
    /// Leechers visible in the swarm.
    pub leechers: i64,
}

/// One row of the append-only `download_history` table.
#[derive(Debug, Clone)]
pub struct CompletedDownload {
    /// Row identifier.
    pub id: i64,
    /// Torrent identity hash.
    pub info_hash: InfoHash,
    /// Display name.
    pub name: String,
    /// Originating provider name.
    pub provider: String,
    /// Total payload size in bytes.
    pub total_bytes: i64,
    /// When the download completed.
    pub completed_at: DateTime<Utc>,
    /// Destination path on disk.
    pub download_path: String,
    /// Number of files in the payload.
    pub file_count: i64,
}
