use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{Settings, Target};
use crate::session::Session;
use crate::ui::Pane;

pub enum AppMode {
    Normal,
    ConfirmDelete, // Confirmation dialog for delete
    Message,       // Error popup, any key closes it
    Disconnected,  // Remote heartbeat lost; reconnect or quit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Left,
    Right,
}

pub struct App {
    pub session: Session,
    pub target: Target,
    pub settings: Settings,
    pub active_pane: ActivePane,
    pub mode: AppMode,
    pub message: String,
    pub popup: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, target: Target, settings: Settings) -> Self {
        let welcome = match &target {
            Target::Ftp(params) => format!("Connected to {} - Tab switches panes", params.record()),
            Target::Mirror(dir) => format!("Mirroring {} - Tab switches panes", dir.display()),
        };

        Self {
            session,
            target,
            settings,
            active_pane: ActivePane::Left,
            mode: AppMode::Normal,
            message: welcome,
            popup: None,
            should_quit: false,
        }
    }

    pub fn switch_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::Left => ActivePane::Right,
            ActivePane::Right => ActivePane::Left,
        };
        self.session.local.is_active = self.active_pane == ActivePane::Left;
        self.session.remote.is_active = self.active_pane == ActivePane::Right;
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        match self.active_pane {
            ActivePane::Left => &mut self.session.local,
            ActivePane::Right => &mut self.session.remote,
        }
    }

    pub fn active_pane(&self) -> &Pane {
        match self.active_pane {
            ActivePane::Left => &self.session.local,
            ActivePane::Right => &self.session.remote,
        }
    }

    /// (focused, other)
    fn panes_mut(&mut self) -> (&mut Pane, &mut Pane) {
        let session = &mut self.session;
        match self.active_pane {
            ActivePane::Left => (&mut session.local, &mut session.remote),
            ActivePane::Right => (&mut session.remote, &mut session.local),
        }
    }

    /// Surface an error in a popup; pane state stays as the pane left it.
    pub fn show_error(&mut self, context: &str, err: &dyn std::fmt::Display) {
        let text = format!("{}: {}", context, err);
        warn!("{}", text);
        self.message = format!("✗ {}", text);
        self.popup = Some(text);
        self.mode = AppMode::Message;
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
        self.mode = AppMode::Normal;
    }

    // ========== Navigation ==========

    pub async fn navigate_into(&mut self) {
        let result = self.active_pane_mut().enter().await;
        if let Err(e) = result {
            self.show_error("Could not open dir", &e);
        }
    }

    pub async fn navigate_up(&mut self) {
        let result = self.active_pane_mut().leave().await;
        if let Err(e) = result {
            self.show_error("Could not open dir", &e);
        }
    }

    pub async fn refresh_active_pane(&mut self) {
        let result = self.active_pane_mut().refresh().await;
        match result {
            Ok(()) => self.message = "Refreshed".to_string(),
            Err(e) => self.show_error("Could not refresh files", &e),
        }
    }

    // ========== Operations ==========

    /// Copy the focused pane's selection into the other pane's location,
    /// refresh the other pane, then clear the selection.
    pub async fn transfer(&mut self) {
        let (source, destination) = self.panes_mut();
        let count = source.selection_count();
        if count == 0 {
            self.message = "Nothing selected (Space toggles selection)".to_string();
            return;
        }

        let destination_root = destination.location().to_string();
        let transferred = source.transfer(&destination_root).await;
        if let Err(e) = transferred {
            self.show_error("Could not transfer files", &e);
            return;
        }
        let refreshed = destination.refresh().await;
        if let Err(e) = refreshed {
            self.show_error("Could not refresh files", &e);
            return;
        }
        source.deselect_all();

        info!(count, destination = %destination_root, "transfer complete");
        self.message = format!("✓ Transferred {} item(s) to {}", count, destination_root);
    }

    /// Ask for confirmation before deleting the focused pane's selection.
    pub fn request_delete(&mut self) {
        let count = self.active_pane().selection_count();
        if count == 0 {
            self.message = "Nothing selected (Space toggles selection)".to_string();
            return;
        }
        self.mode = AppMode::ConfirmDelete;
        self.message = "Press Y to confirm delete, N or Esc to cancel".to_string();
    }

    pub async fn confirm_delete(&mut self) {
        self.mode = AppMode::Normal;
        let pane = self.active_pane_mut();
        let count = pane.selection_count();
        let result = pane.delete().await;
        match result {
            Ok(()) => self.message = format!("✓ Deleted {} item(s)", count),
            Err(e) => self.show_error("Could not delete files", &e),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.mode = AppMode::Normal;
        self.message = "Delete cancelled".to_string();
    }

    // ========== Connection ==========

    /// Check the heartbeat once per UI event. After a loss the remote pane
    /// must not be touched until a reconnect.
    pub fn poll_heartbeat(&mut self) {
        if let Some(lost) = self.session.poll_lost() {
            self.popup = Some(lost.to_string());
            self.message = format!("✗ {}", lost);
            self.mode = AppMode::Disconnected;
        }
    }

    pub async fn reconnect(&mut self) {
        let local_dir = PathBuf::from(self.session.local.location());
        self.message = "Reconnecting...".to_string();

        match Session::open(&self.target, &local_dir, &self.settings).await {
            Ok(session) => {
                let old = std::mem::replace(&mut self.session, session);
                old.close().await;
                self.active_pane = ActivePane::Left;
                self.popup = None;
                self.mode = AppMode::Normal;
                self.message = "✓ Reconnected".to_string();
            }
            Err(e) => {
                warn!(error = %e, "reconnect failed");
                self.popup = Some(format!("Reconnect failed: {:#}", e));
                self.message = "✗ Reconnect failed".to_string();
            }
        }
    }
}
