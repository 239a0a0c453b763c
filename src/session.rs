//! A browsing session: the two panes plus whatever keeps the right one alive.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ConnectParams, Settings, Target};
use crate::error::HeartbeatLost;
use crate::fs::{FtpStore, LocalStore, Store, StoreBackend};
use crate::heartbeat::Heartbeat;
use crate::ui::Pane;

pub struct Session {
    pub local: Pane,
    pub remote: Pane,
    ftp: Option<FtpStore>,
    heartbeat: Option<Heartbeat>,
}

impl Session {
    pub async fn open(target: &Target, local_dir: &Path, settings: &Settings) -> Result<Self> {
        match target {
            Target::Ftp(params) => Self::open_ftp(params, local_dir, settings).await,
            Target::Mirror(dir) => Self::open_mirror(local_dir, dir, settings).await,
        }
    }

    /// Log in and wire local <-> FTP panes. Each pane transfers into the
    /// other side's store and deletes on its own.
    pub async fn open_ftp(params: &ConnectParams, local_dir: &Path, settings: &Settings) -> Result<Self> {
        let ftp = FtpStore::connect(params, settings.connect_timeout())
            .await
            .with_context(|| format!("Could not connect to {}:{}", params.server, params.port))?;

        let local_store: Arc<dyn Store> = Arc::new(LocalStore::new());
        let remote_store: Arc<dyn Store> = Arc::new(ftp.clone());

        let local_backend = StoreBackend::new(local_store.clone())
            .with_transfer_to(remote_store.clone())
            .with_delete();
        let remote_backend = StoreBackend::new(remote_store)
            .with_transfer_to(local_store)
            .with_delete();

        let height = settings.viewport_height;
        let panes = async {
            let local = Pane::with_viewport_height(
                "Local",
                &local_dir.to_string_lossy(),
                Box::new(local_backend),
                height,
            )
            .await?;
            let remote = Pane::with_viewport_height(
                params.server.clone(),
                &params.remote_dir,
                Box::new(remote_backend),
                height,
            )
            .await?;
            Ok::<_, crate::error::PaneError>((local, remote))
        }
        .await;

        let (local, remote) = match panes {
            Ok(panes) => panes,
            Err(e) => {
                let _ = ftp.quit().await;
                return Err(e).context("Could not list initial directories");
            }
        };

        let heartbeat = Heartbeat::spawn(Arc::new(ftp.clone()), settings.heartbeat_interval());
        info!(server = %params.server, "session opened");

        let mut session = Self {
            local,
            remote,
            ftp: Some(ftp),
            heartbeat: Some(heartbeat),
        };
        session.local.is_active = true;
        Ok(session)
    }

    /// Two local directories side by side. Nothing to keep alive.
    pub async fn open_mirror(local_dir: &Path, mirror_dir: &Path, settings: &Settings) -> Result<Self> {
        let left: Arc<dyn Store> = Arc::new(LocalStore::new());
        let right: Arc<dyn Store> = Arc::new(LocalStore::named("Mirror"));

        let left_backend = StoreBackend::new(left.clone())
            .with_transfer_to(right.clone())
            .with_delete();
        let right_backend = StoreBackend::new(right)
            .with_transfer_to(left)
            .with_delete();

        let height = settings.viewport_height;
        let mut local = Pane::with_viewport_height(
            "Local",
            &local_dir.to_string_lossy(),
            Box::new(left_backend),
            height,
        )
        .await
        .context("Could not list local directory")?;
        let remote = Pane::with_viewport_height(
            "Mirror",
            &mirror_dir.to_string_lossy(),
            Box::new(right_backend),
            height,
        )
        .await
        .context("Could not list mirror directory")?;

        local.is_active = true;
        info!(mirror = %mirror_dir.display(), "mirror session opened");
        Ok(Self {
            local,
            remote,
            ftp: None,
            heartbeat: None,
        })
    }

    /// Non-blocking check for a lost remote connection.
    pub fn poll_lost(&mut self) -> Option<HeartbeatLost> {
        self.heartbeat.as_mut()?.poll_lost()
    }

    pub fn is_remote(&self) -> bool {
        self.ftp.is_some()
    }

    /// Stop the heartbeat and say goodbye to the server.
    pub async fn close(mut self) {
        if let Some(mut heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
        if let Some(ftp) = self.ftp.take() {
            if let Err(e) = ftp.quit().await {
                warn!(error = %e, "QUIT failed");
            }
            info!("session closed");
        }
    }
}
