//! Boundary traits implemented by transfer-engine bindings.
//!
//! The orchestrator only ever talks to the engine through these traits; the
//! concrete binding (and whatever native session sits behind it) lives in its
//! own crate and can be swapped without touching orchestration code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::model::{FileEntry, FilePriorityOverride, InfoHash, TransferStats};

/// A single shared engine instance capable of admitting transfers.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    /// Register a magnet URI with the engine and return a handle for the
    /// resulting transfer. Admission does not start the transfer.
    async fn add(&self, magnet: &str) -> EngineResult<Arc<dyn TransferHandle>>;
}

/// Per-transfer handle offering metadata, statistics, and lifecycle control.
///
/// Handles are cheap to clone behind an `Arc` and remain valid until
/// [`TransferHandle::forget`] drops the transfer from the engine.
#[async_trait]
pub trait TransferHandle: Send + Sync {
    /// Block until torrent metadata resolves or the bounded wait elapses.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MetadataTimeout`](crate::EngineError) when the
    /// deadline passes without metadata.
    async fn await_metadata(&self, timeout: Duration) -> EngineResult<()>;

    /// Info hash identifying the transfer. Requires resolved metadata.
    async fn identity(&self) -> EngineResult<InfoHash>;

    /// Total payload size in bytes. Requires resolved metadata.
    async fn total_bytes(&self) -> EngineResult<u64>;

    /// File listing discovered from metadata.
    async fn files(&self) -> EngineResult<Vec<FileEntry>>;

    /// Apply per-file priorities (selected files normal, the rest skipped).
    async fn set_priorities(&self, priorities: &[FilePriorityOverride]) -> EngineResult<()>;

    /// Begin (or resume) fetching pieces.
    async fn start(&self) -> EngineResult<()>;

    /// Stop fetching pieces without dropping engine state.
    async fn stop(&self) -> EngineResult<()>;

    /// Drop the transfer from the engine entirely. The handle is dead
    /// afterwards; on-disk data is not touched.
    async fn forget(&self) -> EngineResult<()>;

    /// Sample current byte counters and swarm statistics.
    async fn stats(&self) -> EngineResult<TransferStats>;
}
