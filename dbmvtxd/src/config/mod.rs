//! Configuration loading
//!
//! The platform configuration is read once at startup. A missing file is not
//! an error: the board defaults apply.

use dbmvtx_core::{PlatformConfig, PlatformError, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load and validate the platform configuration at `path`
pub(crate) async fn load(path: &Path) -> Result<PlatformConfig> {
    let config = if fs::try_exists(path).await.unwrap_or(false) {
        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            PlatformError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        PlatformConfig::from_toml(&content)?
    } else {
        info!(
            "Configuration file not found at {}. Using defaults.",
            path.display()
        );
        PlatformConfig::default()
    };

    config.validate()?;
    Ok(config)
}
