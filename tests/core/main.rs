// Test entry point for the browsing core
// Panes, the transfer engine and the local store are exercised against
// an in-memory store and temporary directories


mod engine_tests;
mod pane_tests;
mod session_tests;
