//! Background worker that owns the session backend and serves commands.

use tokio::sync::mpsc;
use tracing::debug;

use crate::command::EngineCommand;
use crate::session::Session;

pub(crate) fn spawn(mut session: Box<dyn Session>, mut commands: mpsc::Receiver<EngineCommand>) {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            dispatch(session.as_mut(), command).await;
        }
        debug!("engine worker stopped");
    });
}

async fn dispatch(session: &mut dyn Session, command: EngineCommand) {
    // A dropped receiver only means the caller gave up waiting.
    match command {
        EngineCommand::Add { magnet, respond_to } => {
            let _ = respond_to.send(session.add(&magnet).await);
        }
        EngineCommand::Metadata { id, respond_to } => {
            let _ = respond_to.send(session.metadata(id).await);
        }
        EngineCommand::SetPriorities {
            id,
            priorities,
            respond_to,
        } => {
            let _ = respond_to.send(session.set_priorities(id, &priorities).await);
        }
        EngineCommand::Start { id, respond_to } => {
            let _ = respond_to.send(session.start(id).await);
        }
        EngineCommand::Stop { id, respond_to } => {
            let _ = respond_to.send(session.stop(id).await);
        }
        EngineCommand::Remove { id, respond_to } => {
            let _ = respond_to.send(session.remove(id).await);
        }
        EngineCommand::Stats { id, respond_to } => {
            let _ = respond_to.send(session.stats(id).await);
        }
    }
}
