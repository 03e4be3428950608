//! Commands exchanged between the engine front and its worker.

use riptide_core::{EngineResult, FilePriorityOverride, TransferStats};
use tokio::sync::oneshot;

use crate::session::{TransferId, TransferMetadata};

pub(crate) enum EngineCommand {
    Add {
        magnet: String,
        respond_to: oneshot::Sender<EngineResult<TransferId>>,
    },
    Metadata {
        id: TransferId,
        respond_to: oneshot::Sender<EngineResult<Option<TransferMetadata>>>,
    },
    SetPriorities {
        id: TransferId,
        priorities: Vec<FilePriorityOverride>,
        respond_to: oneshot::Sender<EngineResult<()>>,
    },
    Start {
        id: TransferId,
        respond_to: oneshot::Sender<EngineResult<()>>,
    },
    Stop {
        id: TransferId,
        respond_to: oneshot::Sender<EngineResult<()>>,
    },
    Remove {
        id: TransferId,
        respond_to: oneshot::Sender<EngineResult<()>>,
    },
    Stats {
        id: TransferId,
        respond_to: oneshot::Sender<EngineResult<TransferStats>>,
    },
}
