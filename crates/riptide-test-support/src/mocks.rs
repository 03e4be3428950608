//! Scripted transfer-engine double.
//!
//! Tests prime the engine with a [`TransferPlan`] per magnet URI before the
//! code under test calls `add`. Byte counters advance one scripted frame per
//! `stats()` call (the last frame repeats), so monitor loops can be driven
//! deterministically without a real engine.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use riptide_core::{
    EngineError, EngineResult, FileEntry, FilePriorityOverride, InfoHash, TransferEngine,
    TransferHandle, TransferStats,
};

/// Scripted behavior for one transfer.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// Identity hash reported once metadata resolves.
    pub info_hash: InfoHash,
    /// Display name reported by metadata.
    pub name: String,
    /// Total payload size in bytes.
    pub total_bytes: u64,
    /// Files reported by metadata.
    pub files: Vec<FileEntry>,
    /// When false, `await_metadata` sleeps through its timeout and fails.
    pub metadata_ready: bool,
    /// Byte counters returned by successive `stats()` calls.
    pub frames: Vec<u64>,
}

impl TransferPlan {
    /// A single-file transfer with resolved metadata and no scripted frames.
    #[must_use]
    pub fn sized(hash: &str, name: &str, total_bytes: u64) -> Self {
        Self {
            info_hash: InfoHash::new(hash),
            name: name.to_owned(),
            total_bytes,
            files: vec![FileEntry {
                index: 0,
                path: name.to_owned(),
                size_bytes: total_bytes,
            }],
            metadata_ready: true,
            frames: Vec::new(),
        }
    }

    /// Replace the file listing.
    #[must_use]
    pub fn with_files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = files;
        self
    }

    /// Script the byte counters returned by successive `stats()` calls.
    #[must_use]
    pub fn with_frames(mut self, frames: impl Into<Vec<u64>>) -> Self {
        self.frames = frames.into();
        self
    }

    /// Make metadata never resolve, forcing `await_metadata` to time out.
    #[must_use]
    pub fn metadata_never(mut self) -> Self {
        self.metadata_ready = false;
        self
    }
}

/// Call counters recorded by a scripted transfer.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    /// `start()` invocations.
    pub started: u32,
    /// `stop()` invocations.
    pub stopped: u32,
    /// `forget()` invocations.
    pub forgotten: u32,
    /// `stats()` invocations.
    pub stats_calls: u32,
    /// Priority batches applied via `set_priorities`.
    pub priorities: Vec<Vec<FilePriorityOverride>>,
}

/// One live scripted transfer.
pub struct ScriptedTransfer {
    plan: TransferPlan,
    state: Mutex<TransferScript>,
}

struct TransferScript {
    frames: VecDeque<u64>,
    last_frame: u64,
    log: CallLog,
}

impl ScriptedTransfer {
    fn new(plan: TransferPlan) -> Self {
        let frames: VecDeque<u64> = plan.frames.iter().copied().collect();
        Self {
            plan,
            state: Mutex::new(TransferScript {
                frames,
                last_frame: 0,
                log: CallLog::default(),
            }),
        }
    }

    /// Append another byte-counter frame for future `stats()` calls.
    pub fn push_frame(&self, bytes: u64) {
        self.lock().frames.push_back(bytes);
    }

    /// Snapshot of the recorded call counters.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.lock().log.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TransferScript> {
        self.state.lock().expect("scripted transfer lock poisoned")
    }
}

/// Transfer-engine double primed per magnet URI.
#[derive(Default)]
pub struct ScriptedEngine {
    plans: Mutex<HashMap<String, TransferPlan>>,
    transfers: Mutex<HashMap<String, Arc<ScriptedTransfer>>>,
}

impl ScriptedEngine {
    /// Construct an empty engine behind an `Arc` for sharing with the code
    /// under test.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Prime the behavior for a magnet URI before it is added.
    pub fn prime(&self, magnet: &str, plan: TransferPlan) {
        self.plans
            .lock()
            .expect("plan lock poisoned")
            .insert(magnet.to_owned(), plan);
    }

    /// Inspect the live transfer created for a magnet URI, if any.
    #[must_use]
    pub fn transfer(&self, magnet: &str) -> Option<Arc<ScriptedTransfer>> {
        self.transfers
            .lock()
            .expect("transfer lock poisoned")
            .get(magnet)
            .cloned()
    }
}

#[async_trait]
impl TransferEngine for ScriptedEngine {
    async fn add(&self, magnet: &str) -> EngineResult<Arc<dyn TransferHandle>> {
        let plan = self
            .plans
            .lock()
            .expect("plan lock poisoned")
            .get(magnet)
            .cloned()
            .ok_or_else(|| {
                EngineError::operation(
                    "add",
                    std::io::Error::other(format!("no scripted plan for magnet '{magnet}'")),
                )
            })?;
        let transfer = Arc::new(ScriptedTransfer::new(plan));
        self.transfers
            .lock()
            .expect("transfer lock poisoned")
            .insert(magnet.to_owned(), Arc::clone(&transfer));
        Ok(Arc::new(ScriptedHandle { transfer }))
    }
}

struct ScriptedHandle {
    transfer: Arc<ScriptedTransfer>,
}

#[async_trait]
impl TransferHandle for ScriptedHandle {
    async fn await_metadata(&self, timeout: Duration) -> EngineResult<()> {
        if self.transfer.plan.metadata_ready {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(EngineError::MetadataTimeout { waited: timeout })
        }
    }

    async fn identity(&self) -> EngineResult<InfoHash> {
        if self.transfer.plan.metadata_ready {
            Ok(self.transfer.plan.info_hash.clone())
        } else {
            Err(EngineError::MetadataPending)
        }
    }

    async fn total_bytes(&self) -> EngineResult<u64> {
        if self.transfer.plan.metadata_ready {
            Ok(self.transfer.plan.total_bytes)
        } else {
            Err(EngineError::MetadataPending)
        }
    }

    async fn files(&self) -> EngineResult<Vec<FileEntry>> {
        if self.transfer.plan.metadata_ready {
            Ok(self.transfer.plan.files.clone())
        } else {
            Err(EngineError::MetadataPending)
        }
    }

    async fn set_priorities(&self, priorities: &[FilePriorityOverride]) -> EngineResult<()> {
        self.transfer.lock().log.priorities.push(priorities.to_vec());
        Ok(())
    }

    async fn start(&self) -> EngineResult<()> {
        self.transfer.lock().log.started += 1;
        Ok(())
    }

    async fn stop(&self) -> EngineResult<()> {
        self.transfer.lock().log.stopped += 1;
        Ok(())
    }

    async fn forget(&self) -> EngineResult<()> {
        self.transfer.lock().log.forgotten += 1;
        Ok(())
    }

    async fn stats(&self) -> EngineResult<TransferStats> {
        let mut state = self.transfer.lock();
        state.log.stats_calls += 1;
        if let Some(frame) = state.frames.pop_front() {
            state.last_frame = frame;
        }
        let bytes_downloaded = state.last_frame;
        let total = self.transfer.plan.total_bytes;
        let active = total == 0 || bytes_downloaded < total;
        Ok(TransferStats {
            bytes_downloaded,
            bytes_uploaded: bytes_downloaded / 10,
            download_bps: if active { 2_048 } else { 0 },
            upload_bps: if active { 256 } else { 0 },
            peers_connected: 5,
            seeders: 12,
            leechers: 3,
        })
    }
}
