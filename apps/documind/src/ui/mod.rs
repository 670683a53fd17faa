//! Terminal UI: the shell loop and its text panels.

pub mod app;
pub mod render;

pub use app::ShellApp;
