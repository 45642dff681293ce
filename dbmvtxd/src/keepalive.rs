//! Watchdog keepalive task
//!
//! Arms the hardware watchdog at startup and re-arms it on a fixed interval.
//! Re-arming an active watchdog only sends a keepalive.

use dbmvtx_core::Result;
use dbmvtx_hardware::Chassis;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Outcome of one keepalive round
#[derive(Debug)]
enum Feed {
    Fed(u32),
    Failed(dbmvtx_core::PlatformError),
    Unavailable,
}

async fn feed(chassis: &Arc<Mutex<Chassis>>, timeout_secs: i32) -> Feed {
    let mut chassis = chassis.clone().lock_owned().await;
    let result = tokio::task::spawn_blocking(move || {
        chassis
            .watchdog()
            .map(|watchdog| watchdog.try_arm(timeout_secs))
    })
    .await;

    match result {
        Ok(Some(Ok(timeout))) => Feed::Fed(timeout),
        Ok(Some(Err(e))) => Feed::Failed(e),
        Ok(None) => Feed::Unavailable,
        Err(e) => Feed::Failed(dbmvtx_core::PlatformError::Other(format!(
            "Keepalive task failed: {}",
            e
        ))),
    }
}

/// Start feeding the watchdog every `interval`.
///
/// The task ends when the watchdog device cannot be loaded.
pub(crate) fn start(
    chassis: Arc<Mutex<Chassis>>,
    timeout_secs: u32,
    interval: Duration,
) -> Result<JoinHandle<()>> {
    let timeout = i32::try_from(timeout_secs).map_err(|_| {
        dbmvtx_core::PlatformError::InvalidInput(format!(
            "Invalid watchdog timeout: {}",
            timeout_secs
        ))
    })?;

    Ok(tokio::spawn(async move {
        info!(
            "Starting watchdog keepalive ({}s timeout, {}s interval)",
            timeout_secs,
            interval.as_secs()
        );

        loop {
            match feed(&chassis, timeout).await {
                Feed::Fed(timeout) => debug!("Watchdog fed ({}s timeout)", timeout),
                Feed::Failed(e) => warn!("Watchdog keepalive failed: {}", e),
                Feed::Unavailable => {
                    warn!("Watchdog not available, keepalive stopped");
                    return;
                }
            }
            sleep(interval).await;
        }
    }))
}
