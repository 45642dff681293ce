//! Fan handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::api_ok;
use axum::{extract::State, Json};
use dbmvtx_core::api::{ApiResponse, FanStatus, FansResponse};
use dbmvtx_hardware::Fan;

use tracing::debug;

fn fan_status(fan: &Fan) -> FanStatus {
    let rpm = fan.speed_rpm();
    let max_speed = fan.max_speed();
    FanStatus {
        name: fan.name().to_string(),
        psu_fan: fan.is_psu_fan(),
        present: fan.presence(),
        rpm,
        speed_percent: dbmvtx_hardware::fan::speed_percent(rpm, max_speed),
        max_speed,
        direction: fan.direction(),
    }
}

/// Retrieves the current readings of every fan.
///
/// Chassis fans come first in drawer order, followed by PSU fans.
///
/// # Endpoint
///
/// `GET /api/v0/fans`
pub(crate) async fn get_fans(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FansResponse>>, ApiError> {
    debug!("Request: GET /api/v0/fans");

    let fans = state
        .with_chassis(|chassis| chassis.all_fans().map(fan_status).collect::<Vec<_>>())
        .await?;

    debug!("Read {} fans", fans.len());
    api_ok!(FansResponse { fans })
}
