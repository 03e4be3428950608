//! Session backends driven by the engine worker.

use async_trait::async_trait;
use riptide_core::{EngineResult, FileEntry, FilePriorityOverride, InfoHash, TransferStats};

mod sim;

pub use sim::{SimProfile, SimSession};

/// Identifier assigned to a transfer by the session backend.
pub type TransferId = u64;

/// Metadata resolved for a transfer.
#[derive(Debug, Clone)]
pub struct TransferMetadata {
    /// Torrent identity hash.
    pub info_hash: InfoHash,
    /// Resolved display name.
    pub name: String,
    /// Total payload size in bytes.
    pub total_bytes: u64,
    /// Files discovered in the payload.
    pub files: Vec<FileEntry>,
}

/// Backend session interface consumed by the engine worker.
///
/// The worker owns the session exclusively, so methods take `&mut self`; the
/// adapter serializes access through its command channel.
#[async_trait]
pub trait Session: Send {
    /// Admit a magnet URI and return the transfer id.
    async fn add(&mut self, magnet: &str) -> EngineResult<TransferId>;

    /// Metadata for a transfer, or `None` while it is still resolving.
    async fn metadata(&mut self, id: TransferId) -> EngineResult<Option<TransferMetadata>>;

    /// Apply per-file priority overrides.
    async fn set_priorities(
        &mut self,
        id: TransferId,
        priorities: &[FilePriorityOverride],
    ) -> EngineResult<()>;

    /// Begin or resume fetching pieces.
    async fn start(&mut self, id: TransferId) -> EngineResult<()>;

    /// Stop fetching pieces, keeping session state.
    async fn stop(&mut self, id: TransferId) -> EngineResult<()>;

    /// Drop the transfer from the session.
    async fn remove(&mut self, id: TransferId) -> EngineResult<()>;

    /// Sample current statistics.
    async fn stats(&mut self, id: TransferId) -> EngineResult<TransferStats>;
}
