//! Safe wrapper around the engine worker: the [`TransferEngine`] front and
//! the per-transfer handles it hands out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use riptide_core::{
    EngineError, EngineResult, FileEntry, FilePriorityOverride, InfoHash, TransferEngine,
    TransferHandle, TransferStats,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::command::EngineCommand;
use crate::session::{Session, SimProfile, SimSession, TransferId, TransferMetadata};
use crate::worker;

const COMMAND_BUFFER: usize = 128;
const METADATA_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Cloneable front for one shared engine instance.
#[derive(Clone)]
pub struct MagnetEngine {
    commands: mpsc::Sender<EngineCommand>,
}

impl MagnetEngine {
    /// Spawn the engine worker around the given session backend.
    #[must_use]
    pub fn new(session: Box<dyn Session>) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        worker::spawn(session, rx);
        Self { commands }
    }

    /// Convenience constructor for the simulated session backend.
    #[must_use]
    pub fn simulated(profile: SimProfile) -> Self {
        Self::new(Box::new(SimSession::new(profile)))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<EngineResult<T>>) -> EngineCommand,
    ) -> EngineResult<T> {
        request(&self.commands, build).await
    }
}

async fn request<T>(
    commands: &mpsc::Sender<EngineCommand>,
    build: impl FnOnce(oneshot::Sender<EngineResult<T>>) -> EngineCommand,
) -> EngineResult<T> {
    let (respond_to, response) = oneshot::channel();
    commands
        .send(build(respond_to))
        .await
        .map_err(|_| EngineError::Closed)?;
    response.await.map_err(|_| EngineError::Closed)?
}

#[async_trait]
impl TransferEngine for MagnetEngine {
    async fn add(&self, magnet: &str) -> EngineResult<Arc<dyn TransferHandle>> {
        let magnet = magnet.to_owned();
        let id = self
            .request(|respond_to| EngineCommand::Add { magnet, respond_to })
            .await?;
        Ok(Arc::new(SessionHandle {
            id,
            commands: self.commands.clone(),
        }))
    }
}

/// Handle for one transfer served by the engine worker.
struct SessionHandle {
    id: TransferId,
    commands: mpsc::Sender<EngineCommand>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<EngineResult<T>>) -> EngineCommand,
    ) -> EngineResult<T> {
        request(&self.commands, build).await
    }

    async fn metadata(&self) -> EngineResult<Option<TransferMetadata>> {
        let id = self.id;
        self.request(|respond_to| EngineCommand::Metadata { id, respond_to })
            .await
    }

    async fn resolved_metadata(&self) -> EngineResult<TransferMetadata> {
        self.metadata().await?.ok_or(EngineError::MetadataPending)
    }
}

#[async_trait]
impl TransferHandle for SessionHandle {
    async fn await_metadata(&self, timeout: Duration) -> EngineResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.metadata().await?.is_some() {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(EngineError::MetadataTimeout { waited: timeout });
            }
            tokio::time::sleep(METADATA_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn identity(&self) -> EngineResult<InfoHash> {
        Ok(self.resolved_metadata().await?.info_hash)
    }

    async fn total_bytes(&self) -> EngineResult<u64> {
        Ok(self.resolved_metadata().await?.total_bytes)
    }

    async fn files(&self) -> EngineResult<Vec<FileEntry>> {
        Ok(self.resolved_metadata().await?.files)
    }

    async fn set_priorities(&self, priorities: &[FilePriorityOverride]) -> EngineResult<()> {
        let id = self.id;
        let priorities = priorities.to_vec();
        self.request(|respond_to| EngineCommand::SetPriorities {
            id,
            priorities,
            respond_to,
        })
        .await
    }

    async fn start(&self) -> EngineResult<()> {
        let id = self.id;
        self.request(|respond_to| EngineCommand::Start { id, respond_to })
            .await
    }

    async fn stop(&self) -> EngineResult<()> {
        let id = self.id;
        self.request(|respond_to| EngineCommand::Stop { id, respond_to })
            .await
    }

    async fn forget(&self) -> EngineResult<()> {
        let id = self.id;
        self.request(|respond_to| EngineCommand::Remove { id, respond_to })
            .await
    }

    async fn stats(&self) -> EngineResult<TransferStats> {
        let id = self.id;
        self.request(|respond_to| EngineCommand::Stats { id, respond_to })
            .await
    }
}
