use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::{App, AppMode};

pub async fn handle_events(app: &mut App) -> Result<()> {
    // One heartbeat check per UI event
    app.poll_heartbeat();

    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.should_quit = true;
                return Ok(());
            }

            match app.mode {
                AppMode::Normal => handle_normal_mode(app, key).await,
                AppMode::ConfirmDelete => handle_confirm_delete(app, key).await,
                AppMode::Message => app.close_popup(),
                AppMode::Disconnected => handle_disconnected(app, key).await,
            }
        }
    }
    Ok(())
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.switch_pane(),
        KeyCode::Up | KeyCode::Char('k') => app.active_pane_mut().up(),
        KeyCode::Down | KeyCode::Char('j') => app.active_pane_mut().down(),
        KeyCode::Enter => app.navigate_into().await,
        KeyCode::Backspace => app.navigate_up().await,
        KeyCode::Char(' ') => app.active_pane_mut().toggle_selection(),
        KeyCode::Char('t') | KeyCode::F(5) => app.transfer().await,
        KeyCode::Char('d') | KeyCode::F(8) => app.request_delete(),
        KeyCode::Char('r') => app.refresh_active_pane().await,
        _ => {}
    }
}

async fn handle_confirm_delete(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().await,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {
            app.message = "Press Y to confirm delete, N or Esc to cancel".to_string();
        }
    }
}

/// Only reconnect or quit; the broken session is never used again.
async fn handle_disconnected(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => app.reconnect().await,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}
