//! cmdlog-repl: interactive command loop for cmdlog
//!
//! Reads lines with rustyline, dispatches them to commands and prints
//! rendered search results to stdout.

pub mod app;
pub mod commands;
pub mod context;
pub mod history;

pub use app::App;
pub use commands::{Command, CommandError, Outcome, dispatch};
pub use context::Session;
