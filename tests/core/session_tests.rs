// Tests for mirror sessions and the app actions built on them

use ferry::app::{ActivePane, App, AppMode};
use ferry::config::{Settings, Target};
use ferry::session::Session;
use std::fs;
use tempfile::TempDir;

async fn mirror_app(left: &TempDir, right: &TempDir) -> App {
    let settings = Settings::default();
    let target = Target::Mirror(right.path().to_path_buf());
    let session = Session::open(&target, left.path(), &settings).await.unwrap();
    App::new(session, target, settings)
}

#[tokio::test]
async fn test_mirror_session_opens_both_panes() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    fs::write(left.path().join("l.txt"), b"l").unwrap();

    let mut app = mirror_app(&left, &right).await;
    assert!(!app.session.is_remote());
    assert!(app.session.poll_lost().is_none());
    assert!(app.session.local.is_active);
    assert!(!app.session.remote.is_active);
    assert_eq!(app.session.local.entries().len(), 1);
    assert!(app.session.remote.entries().is_empty());

    app.switch_pane();
    assert_eq!(app.active_pane, ActivePane::Right);
    assert!(app.session.remote.is_active);
    assert!(!app.session.local.is_active);
}

#[tokio::test]
async fn test_mirror_session_missing_directory_fails() {
    let left = TempDir::new().unwrap();
    let target = Target::Mirror(left.path().join("missing"));
    let result = Session::open(&target, left.path(), &Settings::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_app_transfer_refreshes_destination_and_deselects() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    fs::write(left.path().join("a.txt"), b"a").unwrap();

    let mut app = mirror_app(&left, &right).await;
    app.active_pane_mut().toggle_selection();
    app.transfer().await;

    assert!(matches!(app.mode, AppMode::Normal));
    assert!(right.path().join("a.txt").exists());
    assert_eq!(app.session.remote.entries().len(), 1);
    assert_eq!(app.session.local.selection_count(), 0);
}

#[tokio::test]
async fn test_app_transfer_without_selection_only_reports() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    fs::write(left.path().join("a.txt"), b"a").unwrap();

    let mut app = mirror_app(&left, &right).await;
    app.transfer().await;
    assert!(matches!(app.mode, AppMode::Normal));
    assert!(app.message.contains("Nothing selected"));
    assert!(!right.path().join("a.txt").exists());
}

#[tokio::test]
async fn test_app_delete_needs_confirmation() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    fs::write(left.path().join("a.txt"), b"a").unwrap();

    let mut app = mirror_app(&left, &right).await;
    app.active_pane_mut().toggle_selection();

    app.request_delete();
    assert!(matches!(app.mode, AppMode::ConfirmDelete));
    app.cancel_delete();
    assert!(left.path().join("a.txt").exists());

    app.request_delete();
    app.confirm_delete().await;
    assert!(matches!(app.mode, AppMode::Normal));
    assert!(!left.path().join("a.txt").exists());
    assert!(app.session.local.entries().is_empty());
}

#[tokio::test]
async fn test_app_navigation_error_shows_popup() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    fs::write(left.path().join("file.txt"), b"f").unwrap();

    let mut app = mirror_app(&left, &right).await;
    app.navigate_into().await;

    assert!(matches!(app.mode, AppMode::Message));
    assert!(app.popup.is_some());
    assert_eq!(app.session.local.location(), left.path().to_string_lossy());

    app.close_popup();
    assert!(matches!(app.mode, AppMode::Normal));
    assert!(app.popup.is_none());
}
