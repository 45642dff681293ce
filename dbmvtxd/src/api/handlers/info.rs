//! Info handlers for system information and root endpoint

use crate::api::error::ApiError;
use crate::api::AppState;

use axum::{extract::State, Json};
use dbmvtx_core::api::{ApiResponse, InfoResponse};
use serde_json::{json, Value};
use tracing::debug;

/// Handle the root endpoint.
///
/// Provide basic service identification and status. Useful for health checks
/// and verifying the API is accessible.
///
/// # Endpoint
///
/// `GET /`
pub(crate) async fn root() -> Result<Json<ApiResponse<Value>>, ApiError> {
    debug!("Request: GET /");

    let data = json!({
        "service": "DB-MVTX9180 Platform API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    });

    Ok(Json(ApiResponse::success(data)))
}

/// Retrieve daemon and chassis information.
///
/// # Endpoint
///
/// `GET /api/v0/info`
///
/// # Returns
///
/// - `version` - Daemon version
/// - `platform` - Configured chassis name
/// - `mock` - Whether the daemon runs on simulated hardware
/// - `uptime` - Daemon uptime in seconds
/// - `num_ports` - Number of transceiver ports
/// - `watchdog_enabled` - Whether the daemon keeps the watchdog fed
/// - `reboot_cause` - Cause of the previous reboot
pub(crate) async fn get_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InfoResponse>>, ApiError> {
    debug!("Request: GET /api/v0/info");

    let uptime = state.start_time.elapsed().as_secs();
    let mock = state.mock;

    let info = state
        .with_chassis(move |chassis| InfoResponse {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: chassis.name().to_string(),
            mock,
            uptime,
            num_ports: chassis.num_sfps(),
            watchdog_enabled: chassis.config().watchdog.enabled,
            reboot_cause: chassis.reboot_cause(),
        })
        .await?;

    Ok(Json(ApiResponse::success(info)))
}
