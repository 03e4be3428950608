//! Simulated session backend.
//!
//! Resolves metadata on admission and advances byte counters at a fixed
//! configurable rate while a transfer is started. Stands in for a native
//! session in development builds and drives deterministic tests when the
//! tokio clock is paused.

use std::collections::HashMap;

use async_trait::async_trait;
use riptide_core::{EngineError, EngineResult, FileEntry, FilePriorityOverride, TransferStats};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::{Session, TransferId, TransferMetadata};
use crate::magnet::parse_magnet;

// Fixed placeholder swarm numbers reported while a transfer is active.
const SIM_PEERS: u32 = 8;
const SIM_SEEDERS: u32 = 24;
const SIM_LEECHERS: u32 = 6;

/// Tuning knobs for the simulated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimProfile {
    /// Payload size assumed when the magnet carries no `xl` hint.
    pub default_total_bytes: u64,
    /// Bytes per second earned while a transfer is started.
    pub rate_bps: u64,
    /// Number of files synthesized per payload.
    pub file_count: u32,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            default_total_bytes: 64 * 1024 * 1024,
            rate_bps: 16 * 1024 * 1024,
            file_count: 2,
        }
    }
}

/// In-memory simulated session.
#[derive(Default)]
pub struct SimSession {
    profile: SimProfile,
    transfers: HashMap<TransferId, SimTransfer>,
    next_id: TransferId,
}

struct SimTransfer {
    metadata: TransferMetadata,
    priorities: Vec<FilePriorityOverride>,
    activity: Activity,
}

enum Activity {
    Idle { carried: u64 },
    Active { since: Instant, carried: u64 },
}

impl SimSession {
    /// Construct a session with the given profile.
    #[must_use]
    pub fn new(profile: SimProfile) -> Self {
        Self {
            profile,
            transfers: HashMap::new(),
            next_id: 0,
        }
    }

    fn transfer_mut(&mut self, id: TransferId) -> EngineResult<&mut SimTransfer> {
        self.transfers
            .get_mut(&id)
            .ok_or(EngineError::UnknownTransfer)
    }
}

impl SimTransfer {
    fn bytes_downloaded(&self, rate_bps: u64) -> u64 {
        let total = self.metadata.total_bytes;
        match self.activity {
            Activity::Idle { carried } => carried.min(total),
            Activity::Active { since, carried } => {
                let earned = u64::try_from(
                    since
                        .elapsed()
                        .as_millis()
                        .saturating_mul(u128::from(rate_bps))
                        / 1_000,
                )
                .unwrap_or(u64::MAX);
                carried.saturating_add(earned).min(total)
            }
        }
    }
}

#[async_trait]
impl Session for SimSession {
    async fn add(&mut self, magnet: &str) -> EngineResult<TransferId> {
        let parsed = parse_magnet(magnet).map_err(|err| EngineError::operation("add", err))?;
        let name = parsed.display_name.unwrap_or_else(|| {
            let hash = parsed.info_hash.as_str();
            format!("transfer-{}", &hash[..hash.len().min(8)])
        });
        let total_bytes = parsed
            .exact_length
            .unwrap_or(self.profile.default_total_bytes);
        let files = payload_files(&name, total_bytes, self.profile.file_count);

        let id = self.next_id;
        self.next_id += 1;
        self.transfers.insert(
            id,
            SimTransfer {
                metadata: TransferMetadata {
                    info_hash: parsed.info_hash,
                    name,
                    total_bytes,
                    files,
                },
                priorities: Vec::new(),
                activity: Activity::Idle { carried: 0 },
            },
        );
        debug!(transfer_id = id, "simulated transfer admitted");
        Ok(id)
    }

    async fn metadata(&mut self, id: TransferId) -> EngineResult<Option<TransferMetadata>> {
        // The simulated session resolves metadata on admission.
        let transfer = self.transfer_mut(id)?;
        Ok(Some(transfer.metadata.clone()))
    }

    async fn set_priorities(
        &mut self,
        id: TransferId,
        priorities: &[FilePriorityOverride],
    ) -> EngineResult<()> {
        let transfer = self.transfer_mut(id)?;
        transfer.priorities = priorities.to_vec();
        Ok(())
    }

    async fn start(&mut self, id: TransferId) -> EngineResult<()> {
        let transfer = self.transfer_mut(id)?;
        if let Activity::Idle { carried } = transfer.activity {
            transfer.activity = Activity::Active {
                since: Instant::now(),
                carried,
            };
        }
        Ok(())
    }

    async fn stop(&mut self, id: TransferId) -> EngineResult<()> {
        let rate = self.profile.rate_bps;
        let transfer = self.transfer_mut(id)?;
        if matches!(transfer.activity, Activity::Active { .. }) {
            let carried = transfer.bytes_downloaded(rate);
            transfer.activity = Activity::Idle { carried };
        }
        Ok(())
    }

    async fn remove(&mut self, id: TransferId) -> EngineResult<()> {
        self.transfers
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::UnknownTransfer)
    }

    async fn stats(&mut self, id: TransferId) -> EngineResult<TransferStats> {
        let rate = self.profile.rate_bps;
        let transfer = self.transfer_mut(id)?;
        let bytes_downloaded = transfer.bytes_downloaded(rate);
        let total = transfer.metadata.total_bytes;
        let active = matches!(transfer.activity, Activity::Active { .. })
            && (total == 0 || bytes_downloaded < total);

        Ok(TransferStats {
            bytes_downloaded,
            bytes_uploaded: bytes_downloaded / 8,
            download_bps: if active { rate } else { 0 },
            upload_bps: if active { rate / 8 } else { 0 },
            peers_connected: if active { SIM_PEERS } else { 0 },
            seeders: SIM_SEEDERS,
            leechers: SIM_LEECHERS,
        })
    }
}

fn payload_files(name: &str, total_bytes: u64, count: u32) -> Vec<FileEntry> {
    let count = count.max(1);
    if count == 1 {
        return vec![FileEntry {
            index: 0,
            path: name.to_owned(),
            size_bytes: total_bytes,
        }];
    }
    let base = total_bytes / u64::from(count);
    (0..count)
        .map(|index| FileEntry {
            index,
            path: format!("{name}/part-{index:02}.bin"),
            size_bytes: if index == count - 1 {
                total_bytes - base * u64::from(count - 1)
            } else {
                base
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn profile() -> SimProfile {
        SimProfile {
            default_total_bytes: 1_000,
            rate_bps: 100,
            file_count: 2,
        }
    }

    const MAGNET: &str = "magnet:?xt=urn:btih:c12fe1c06bde254f72ab59b87c5f0288a6b95a20&dn=demo";

    #[tokio::test(start_paused = true)]
    async fn transfer_earns_bytes_only_while_started() -> anyhow::Result<()> {
        let mut session = SimSession::new(profile());
        let id = session.add(MAGNET).await?;

        let stats = session.stats(id).await?;
        assert_eq!(stats.bytes_downloaded, 0);
        assert_eq!(stats.peers_connected, 0);

        session.start(id).await?;
        tokio::time::advance(Duration::from_secs(4)).await;
        let stats = session.stats(id).await?;
        assert_eq!(stats.bytes_downloaded, 400);
        assert_eq!(stats.download_bps, 100);
        assert_eq!(stats.peers_connected, SIM_PEERS);

        session.stop(id).await?;
        tokio::time::advance(Duration::from_secs(4)).await;
        let stats = session.stats(id).await?;
        assert_eq!(stats.bytes_downloaded, 400, "paused transfers earn nothing");
        assert_eq!(stats.download_bps, 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn bytes_cap_at_the_payload_size() -> anyhow::Result<()> {
        let mut session = SimSession::new(profile());
        let id = session.add(MAGNET).await?;
        session.start(id).await?;
        tokio::time::advance(Duration::from_secs(60)).await;

        let stats = session.stats(id).await?;
        assert_eq!(stats.bytes_downloaded, 1_000);
        assert_eq!(stats.download_bps, 0, "complete transfers stop earning");
        Ok(())
    }

    #[tokio::test]
    async fn metadata_resolves_on_admission() -> anyhow::Result<()> {
        let mut session = SimSession::new(profile());
        let id = session.add(MAGNET).await?;
        let metadata = session.metadata(id).await?.expect("metadata ready");
        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.total_bytes, 1_000);
        assert_eq!(metadata.files.len(), 2);
        let sized: u64 = metadata.files.iter().map(|file| file.size_bytes).sum();
        assert_eq!(sized, 1_000);
        Ok(())
    }

    #[tokio::test]
    async fn removed_transfers_become_unknown() -> anyhow::Result<()> {
        let mut session = SimSession::new(profile());
        let id = session.add(MAGNET).await?;
        session.remove(id).await?;
        assert!(matches!(
            session.stats(id).await,
            Err(EngineError::UnknownTransfer)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn exact_length_hint_overrides_the_profile() -> anyhow::Result<()> {
        let mut session = SimSession::new(profile());
        let id = session
            .add("magnet:?xt=urn:btih:ffffffffffffffffffffffffffffffffffffffff&xl=42")
            .await?;
        let metadata = session.metadata(id).await?.expect("metadata ready");
        assert_eq!(metadata.total_bytes, 42);
        Ok(())
    }
}
