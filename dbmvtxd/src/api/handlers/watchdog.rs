//! Watchdog handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::{api_fail, api_ok};
use axum::{
    extract::{Query, State},
    Json,
};
use dbmvtx_core::api::{ApiResponse, WatchdogArmResponse, WatchdogStatus};
use dbmvtx_core::PlatformError;
use serde::Deserialize;

use tracing::{debug, info};

/// Query parameters for arming the watchdog
#[derive(Deserialize)]
pub(crate) struct ArmQuery {
    /// Timeout in seconds (0-340)
    pub seconds: Option<i64>,
}

fn unavailable() -> ApiError {
    ApiError::service_unavailable("Watchdog not available")
}

/// Retrieves the watchdog state.
///
/// Reports `available: false` when the watchdog device cannot be loaded.
///
/// # Endpoint
///
/// `GET /api/v0/watchdog`
pub(crate) async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WatchdogStatus>>, ApiError> {
    debug!("Request: GET /api/v0/watchdog");

    let status = state
        .with_chassis(|chassis| match chassis.watchdog() {
            Some(watchdog) => WatchdogStatus {
                available: true,
                armed: watchdog.is_armed(),
                remaining_secs: watchdog.remaining_time(),
                timeout_secs: watchdog.timeout(),
            },
            None => WatchdogStatus {
                available: false,
                armed: false,
                remaining_secs: -1,
                timeout_secs: 0,
            },
        })
        .await?;

    api_ok!(status)
}

/// Arms the watchdog, or feeds it when it is already running.
///
/// # Endpoint
///
/// `GET /api/v0/watchdog/arm?seconds=180`
///
/// # Query Parameters
///
/// - `seconds` - Timeout in seconds (0-340)
pub(crate) async fn arm(
    State(state): State<AppState>,
    Query(params): Query<ArmQuery>,
) -> Result<Json<ApiResponse<WatchdogArmResponse>>, ApiError> {
    debug!("Request: GET /api/v0/watchdog/arm");

    let Some(seconds) = params.seconds else {
        return api_fail!("Missing 'seconds' parameter");
    };
    let Ok(seconds) = i32::try_from(seconds) else {
        return api_fail!(format!("Invalid timeout: {}", seconds));
    };

    let result = state
        .with_chassis(move |chassis| {
            chassis
                .watchdog()
                .map(|watchdog| watchdog.try_arm(seconds))
        })
        .await?;

    match result {
        Some(Ok(timeout_secs)) => {
            info!("Watchdog armed via API ({}s)", timeout_secs);
            api_ok!(WatchdogArmResponse { timeout_secs })
        }
        Some(Err(e)) => Err(ApiError::from(e)),
        None => Err(unavailable()),
    }
}

/// Disarms the watchdog.
///
/// # Endpoint
///
/// `GET /api/v0/watchdog/disarm`
pub(crate) async fn disarm(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    debug!("Request: GET /api/v0/watchdog/disarm");

    let result: Option<Result<(), PlatformError>> = state
        .with_chassis(|chassis| chassis.watchdog().map(|watchdog| watchdog.try_disarm()))
        .await?;

    match result {
        Some(Ok(())) => {
            info!("Watchdog disarmed via API");
            api_ok!(())
        }
        Some(Err(e)) => Err(ApiError::from(e)),
        None => Err(unavailable()),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_json, test_config, TestApp};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn get(app: &TestApp, uri: &str) -> Response {
        app.router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// App whose watchdog sysfs lives in a temp dir and whose device node is
    /// a regular file, so control calls fail like a missing driver.
    fn app_with_sysfs() -> (TestApp, TempDir) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("state"), "active\n").unwrap();
        fs::write(dir.path().join("timeout"), "120\n").unwrap();
        fs::write(dir.path().join("timeleft"), "42\n").unwrap();
        fs::write(dir.path().join("watchdog1"), "").unwrap();

        let mut config = test_config();
        config.watchdog.sysfs_dir = dir.path().to_path_buf();
        config.watchdog.device = dir.path().join("watchdog1");
        (TestApp::with_config(config), dir)
    }

    #[tokio::test]
    async fn test_status_without_watchdog() {
        let app = TestApp::new();
        let response = get(&app, "/api/v0/watchdog").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["data"]["available"], false);
        assert_eq!(json["data"]["remaining_secs"], -1);
    }

    #[tokio::test]
    async fn test_status_from_sysfs() {
        let (app, _dir) = app_with_sysfs();
        let response = get(&app, "/api/v0/watchdog").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["data"]["available"], true);
        assert_eq!(json["data"]["armed"], true);
        assert_eq!(json["data"]["remaining_secs"], 42);
        assert_eq!(json["data"]["timeout_secs"], 120);
    }

    #[tokio::test]
    async fn test_arm_validation() {
        let (app, _dir) = app_with_sysfs();

        let response = get(&app, "/api/v0/watchdog/arm").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&app, "/api/v0/watchdog/arm?seconds=341").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&app, "/api/v0/watchdog/arm?seconds=-1").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_control_failure_is_unavailable() {
        let (app, _dir) = app_with_sysfs();

        let response = get(&app, "/api/v0/watchdog/arm?seconds=60").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = get(&app, "/api/v0/watchdog/disarm").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_arm_without_watchdog() {
        let app = TestApp::new();
        let response = get(&app, "/api/v0/watchdog/arm?seconds=60").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
