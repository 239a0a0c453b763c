// Library module for ferry
// Re-exports modules for use in integration tests and the binary

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod heartbeat;
pub mod logging;
pub mod session;
pub mod ui;
