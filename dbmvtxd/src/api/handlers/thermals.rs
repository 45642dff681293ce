//! Thermal handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::api_ok;
use axum::{extract::State, Json};
use dbmvtx_core::api::{ApiResponse, ThermalStatus, ThermalsResponse};
use dbmvtx_hardware::Thermal;

use tracing::debug;

fn thermal_status(thermal: &mut Thermal) -> ThermalStatus {
    ThermalStatus {
        name: thermal.name().to_string(),
        label: thermal.label(),
        temperature: thermal.temperature(),
        min_recorded: thermal.min_recorded(),
        max_recorded: thermal.max_recorded(),
        high_threshold: thermal.high_threshold().ok(),
        high_critical_threshold: thermal.high_critical_threshold().ok(),
    }
}

/// Retrieves every temperature sensor.
///
/// Each request samples the sensors, which also updates the recorded
/// minimum and maximum. Thresholds are omitted for sensors without them.
///
/// # Endpoint
///
/// `GET /api/v0/thermals`
pub(crate) async fn get_thermals(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ThermalsResponse>>, ApiError> {
    debug!("Request: GET /api/v0/thermals");

    let thermals = state
        .with_chassis(|chassis| {
            chassis
                .all_thermals_mut()
                .map(thermal_status)
                .collect::<Vec<_>>()
        })
        .await?;

    api_ok!(ThermalsResponse { thermals })
}
