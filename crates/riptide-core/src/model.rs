//! Core domain types shared between the store, the engine binding, and the
//! download orchestrator.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StateParseError;

/// Torrent identity: the lowercase hex info hash reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoHash(String);

impl InfoHash {
    /// Normalize a raw hash string (case-folded to lowercase).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InfoHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Row identifier assigned by the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub i64);

impl Display for DownloadId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of a download.
///
/// Valid transitions: `Pending -> Downloading -> {Paused <-> Downloading} ->
/// Completed`. Removal is terminal from any non-completed state and deletes
/// the durable record instead of writing a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    /// Record created, transfer not yet started.
    Pending,
    /// Transfer active; the monitor task owns the record.
    Downloading,
    /// Transfer stopped by the user; record stays at rest.
    Paused,
    /// Terminal: all selected bytes fetched, history row written.
    Completed,
}

impl DownloadState {
    /// Stable string encoding used by the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    /// Whether the state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl FromStr for DownloadState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "downloading" => Ok(Self::Downloading),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            other => Err(StateParseError(other.to_owned())),
        }
    }
}

impl Display for DownloadState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Point-in-time transfer statistics sampled from the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Payload bytes fetched so far.
    pub bytes_downloaded: u64,
    /// Payload bytes served to peers so far.
    pub bytes_uploaded: u64,
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

impl TransferStats {
    /// Completion percentage (0-100) against the given payload size.
    #[must_use]
    pub fn percent_complete(&self, total_bytes: u64) -> f64 {
        if total_bytes == 0 {
            0.0
        } else {
            (to_f64(self.bytes_downloaded) / to_f64(total_bytes)) * 100.0
        }
    }
}

const fn to_f64(value: u64) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "u64 to f64 conversion is required for user-facing percentage reporting"
    )]
    {
        value as f64
    }
}

/// Individual file exposed by a transfer once metadata is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Index of the file within the torrent payload.
    pub index: u32,
    /// Relative path of the file within the payload.
    pub path: String,
    /// Total size of the file in bytes.
    pub size_bytes: u64,
}

/// Priority level recognized by the engine boundary.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilePriority {
    /// Do not download the file.
    Skip,
    /// Default priority level assigned by the engine.
    #[default]
    Normal,
}

/// Per-file priority override applied after metadata discovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePriorityOverride {
    /// File index within the torrent payload.
    pub index: u32,
    /// Desired priority for the file.
    pub priority: FilePriority,
}

/// A single search result as returned by an index provider.
///
/// Sizes and swarm counts stay in the provider's own display formatting; the
/// orchestrator only ever consumes the magnet URI and the display fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TorrentSummary {
    pub name: String,
    pub magnet: String,
    pub provider: String,
    pub size: String,
    pub seeders: String,
    pub leechers: String,
    pub category: String,
    pub date_uploaded: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_hash_normalizes_case() {
        let hash = InfoHash::new("C12FE1C06BDE254F72AB59B87C5F0288A6B95A20");
        assert_eq!(hash.as_str(), "c12fe1c06bde254f72ab59b87c5f0288a6b95a20");
    }

    #[test]
    fn state_round_trips_through_db_encoding() {
        for state in [
            DownloadState::Pending,
            DownloadState::Downloading,
            DownloadState::Paused,
            DownloadState::Completed,
        ] {
            assert_eq!(state.as_str().parse::<DownloadState>().unwrap(), state);
        }
        assert!("seeding".parse::<DownloadState>().is_err());
    }

    #[test]
    fn only_completed_is_terminal() {
        assert!(DownloadState::Completed.is_terminal());
        assert!(!DownloadState::Paused.is_terminal());
        assert!(!DownloadState::Downloading.is_terminal());
    }

    #[test]
    fn percent_complete_handles_zero_total() {
        let stats = TransferStats {
            bytes_downloaded: 512,
            ..TransferStats::default()
        };
        assert!(stats.percent_complete(0).abs() < f64::EPSILON);
        assert!((stats.percent_complete(1_024) - 50.0).abs() < f64::EPSILON);
    }
}
