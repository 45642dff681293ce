//! Firmware component handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::api_ok;
use axum::{extract::State, Json};
use dbmvtx_core::api::{ApiResponse, ComponentInfo, ComponentsResponse};

use tracing::debug;

/// Lists firmware components with their current versions.
///
/// # Endpoint
///
/// `GET /api/v0/components`
pub(crate) async fn get_components(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ComponentsResponse>>, ApiError> {
    debug!("Request: GET /api/v0/components");

    let components = state
        .with_chassis(|chassis| {
            chassis
                .components()
                .iter()
                .map(|component| ComponentInfo {
                    name: component.name().to_string(),
                    description: component.description().to_string(),
                    firmware_version: component.firmware_version(),
                })
                .collect::<Vec<_>>()
        })
        .await?;

    api_ok!(ComponentsResponse { components })
}
