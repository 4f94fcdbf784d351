//! History file location
//!
//! Defaults to `~/.cmdlog_history`. `CMDLOG_HISTORY` overrides the path,
//! and an empty value disables history persistence.

use std::env;
use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = ".cmdlog_history";
pub const HISTORY_ENV: &str = "CMDLOG_HISTORY";

/// Resolve the history path from the environment and home directory
pub fn history_path() -> Option<PathBuf> {
    resolve_history_path(env::var(HISTORY_ENV).ok(), dirs_next::home_dir())
}

fn resolve_history_path(custom: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
    match custom {
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => home.map(|home| home.join(DEFAULT_HISTORY_FILE)),
    }
}
