//! Shutdown handling for graceful daemon termination
//!
//! Disarms the hardware watchdog so that stopping the daemon on purpose does
//! not reset the switch once the keepalives stop.

use dbmvtx_core::config::WatchdogConfig;
use dbmvtx_hardware::Chassis;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Disarm the watchdog before shutdown.
///
/// Runs only when the watchdog is managed by the daemon, disarming on
/// shutdown is enabled and the daemon drives real hardware.
///
/// # Arguments
///
/// * `watchdog_config` - Watchdog section of the platform configuration
/// * `chassis` - Shared chassis
/// * `is_mock` - Whether running in mock mode (skips the disarm)
pub(crate) async fn disarm_watchdog(
    watchdog_config: &WatchdogConfig,
    chassis: &Arc<Mutex<Chassis>>,
    is_mock: bool,
) {
    if !watchdog_config.enabled {
        info!("Watchdog not managed by the daemon - nothing to disarm");
        return;
    }

    if !watchdog_config.disarm_on_shutdown {
        info!("Watchdog disarm on shutdown disabled in config");
        return;
    }

    if is_mock {
        info!("Mock mode - skipping watchdog disarm");
        return;
    }

    info!("Disarming watchdog...");

    let mut chassis = chassis.clone().lock_owned().await;
    let result = tokio::task::spawn_blocking(move || {
        chassis
            .watchdog()
            .map(|watchdog| watchdog.try_disarm())
    })
    .await;

    match result {
        Ok(Some(Ok(()))) => info!("Watchdog disarmed successfully"),
        Ok(Some(Err(e))) => warn!("Failed to disarm watchdog: {}", e),
        Ok(None) => warn!("Watchdog not available - cannot disarm"),
        Err(e) => warn!("Watchdog disarm task failed: {}", e),
    }
}
