//! Default path resolution for configuration files
//!
//! Uses XDG Base Directory specification when available, with sensible fallbacks.

use std::path::PathBuf;

/// Returns the default path for the platform configuration file.
///
/// Uses XDG config directory if available:
/// - Linux: `~/.config/dbmvtx/platform.toml`
/// - Fallback: `/etc/dbmvtx/platform.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("dbmvtx")
        .join("platform.toml")
}
