//! Engine-agnostic domain types and boundary traits shared across the workspace.

pub mod engine;
pub mod error;
pub mod model;

pub use engine::{TransferEngine, TransferHandle};
pub use error::{EngineError, EngineResult};
pub use model::{
    DownloadId, DownloadState, FileEntry, FilePriority, FilePriorityOverride, InfoHash,
    TorrentSummary, TransferStats,
};
