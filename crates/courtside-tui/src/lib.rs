// Library root: exposes the app loop, message types and TUI so the binary
// and integration tests share them.

pub mod app;
pub mod protocol;
pub mod tui;
