//! File utility functions

use std::path::PathBuf;

/// Expand a user-supplied path (token file, config file) to an absolute path.
///
/// - `~` and `~/rest` resolve against the home directory
/// - relative paths and bare names resolve against the working directory
/// - absolute paths are returned unchanged
///
/// ```text
/// expand_path("~/.smartthings_exporter/token.json") // -> /home/user/.smartthings_exporter/token.json
/// expand_path("token.json")                         // -> /current/dir/token.json
/// expand_path("/etc/smartthings/token.json")        // -> /etc/smartthings/token.json
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}
