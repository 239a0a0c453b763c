//! Background keep-alive for a remote session.
//!
//! A task probes the session at a fixed interval. The owner talks to it
//! through two single-use channels: `quit` (owner to task) ends the loop
//! quietly, `lost` (task to owner) carries the first probe failure, after
//! which the loop ends. There is no retry.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::{HeartbeatLost, StoreResult};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// A no-content liveness call against a remote session.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> StoreResult<()>;
}

pub struct Heartbeat {
    quit: Option<oneshot::Sender<()>>,
    lost: Option<oneshot::Receiver<HeartbeatLost>>,
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// Start probing. The first probe fires one `interval` from now.
    pub fn spawn(probe: Arc<dyn Probe>, interval: Duration) -> Self {
        let (quit_tx, mut quit_rx) = oneshot::channel::<()>();
        let (lost_tx, lost_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // Also fires when the owner is dropped.
                    _ = &mut quit_rx => {
                        debug!("heartbeat stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        if let Err(err) = probe.probe().await {
                            warn!(error = %err, "heartbeat probe failed");
                            let _ = lost_tx.send(HeartbeatLost(err));
                            return;
                        }
                        debug!("heartbeat ok");
                    }
                }
            }
        });

        Self {
            quit: Some(quit_tx),
            lost: Some(lost_rx),
            handle,
        }
    }

    /// Non-blocking check for a lost session. Yields the failure once.
    pub fn poll_lost(&mut self) -> Option<HeartbeatLost> {
        let rx = self.lost.as_mut()?;
        match rx.try_recv() {
            Ok(lost) => {
                self.lost = None;
                Some(lost)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.lost = None;
                None
            }
        }
    }

    /// Wait until the session is lost. Returns `None` if the heartbeat was
    /// stopped instead, or the failure was already taken.
    pub async fn lost(&mut self) -> Option<HeartbeatLost> {
        let rx = self.lost.take()?;
        rx.await.ok()
    }

    /// Stop probing without reporting anything.
    pub fn stop(&mut self) {
        if let Some(quit) = self.quit.take() {
            let _ = quit.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}
