//! File utility functions

use std::path::PathBuf;

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Expand `~` and make relative paths absolute against the working directory.
/// An empty string resolves to the working directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return current_dir();
    }

    let home = dirs::home_dir();
    let expanded = if path == "~"
        && let Some(home) = &home
    {
        home.clone()
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = &home
    {
        home.join(rest)
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        current_dir().join(expanded)
    } else {
        expanded
    }
}
