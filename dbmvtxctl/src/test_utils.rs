//! Test utilities for CLI testing
//!
//! Provides a mock daemon serving canned platform data on a random local port.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use dbmvtx_core::api::{
    ApiResponse, ComponentInfo, ComponentsResponse, FanStatus, FansResponse, InfoResponse,
    SfpEventRecord, SfpEventsResponse, SfpPresenceResponse, ThermalStatus, ThermalsResponse,
    WatchdogArmResponse, WatchdogStatus,
};
use dbmvtx_core::{FanDirection, PresenceCode, RebootCause, RebootCauseKind};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const MOCK_PORTS: usize = 32;

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    /// Ports with a module plugged in
    pub present: Arc<Mutex<BTreeSet<usize>>>,
    /// Recorded transceiver events
    pub events: Arc<Mutex<Vec<SfpEventRecord>>>,
    /// Armed watchdog timeout, `None` when disarmed
    pub watchdog: Arc<Mutex<Option<u32>>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        Self {
            present: Arc::new(Mutex::new(BTreeSet::from([0, 4]))),
            events: Arc::new(Mutex::new(Vec::new())),
            watchdog: Arc::new(Mutex::new(None)),
        }
    }
}

impl MockServerState {
    /// Record a transceiver event as the daemon's monitor would
    pub fn push_event(&self, port: usize, event: PresenceCode) {
        self.events.lock().unwrap().push(SfpEventRecord {
            timestamp_ms: 1_700_000_000_000,
            port,
            event,
        });
    }

    pub fn watchdog_armed(&self) -> bool {
        self.watchdog.lock().unwrap().is_some()
    }
}

/// Query parameters for arming the watchdog
#[derive(Debug, Deserialize)]
pub struct ArmQuery {
    seconds: u32,
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Start the mock server and return the address
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
        }

        Ok((self, server_url))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    /// Create the mock server router
    fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/api/v0/info", get(info_handler))
            .route("/api/v0/fans", get(fans_handler))
            .route("/api/v0/thermals", get(thermals_handler))
            .route("/api/v0/components", get(components_handler))
            .route("/api/v0/watchdog", get(watchdog_handler))
            .route("/api/v0/watchdog/arm", get(arm_handler))
            .route("/api/v0/watchdog/disarm", get(disarm_handler))
            .route("/api/v0/sfp/events", get(events_handler))
            .route("/api/v0/sfp/:port", get(presence_handler))
            .with_state(self.state.clone())
    }
}

/// Sample fans: two chassis fans and one PSU fan
pub fn sample_fans() -> FansResponse {
    FansResponse {
        fans: vec![
            FanStatus {
                name: "Fantray1_Fan1".to_string(),
                psu_fan: false,
                present: true,
                rpm: 12000,
                speed_percent: 47,
                max_speed: 25300,
                direction: FanDirection::Intake,
            },
            FanStatus {
                name: "Fantray1_Fan2".to_string(),
                psu_fan: false,
                present: false,
                rpm: 0,
                speed_percent: 0,
                max_speed: 22550,
                direction: FanDirection::Exhaust,
            },
            FanStatus {
                name: "PSU1_Fan1".to_string(),
                psu_fan: true,
                present: true,
                rpm: 8123,
                speed_percent: 39,
                max_speed: 21000,
                direction: FanDirection::NotApplicable,
            },
        ],
    }
}

/// Sample sensors: one chassis sensor and one PSU sensor without a reading
pub fn sample_thermals() -> ThermalsResponse {
    ThermalsResponse {
        thermals: vec![
            ThermalStatus {
                name: "Temp1".to_string(),
                label: "Internal Temp Sensor".to_string(),
                temperature: Some(28.0),
                min_recorded: Some(27.0),
                max_recorded: Some(30.5),
                high_threshold: Some(85.0),
                high_critical_threshold: Some(85.0),
            },
            ThermalStatus {
                name: "PSU2_Temp1".to_string(),
                label: "PSU2 Temp".to_string(),
                temperature: None,
                min_recorded: None,
                max_recorded: None,
                high_threshold: None,
                high_critical_threshold: None,
            },
        ],
    }
}

pub fn sample_info() -> InfoResponse {
    InfoResponse {
        version: "0.1.0-test".to_string(),
        platform: "DB-MVTX9180".to_string(),
        mock: true,
        uptime: 3600,
        num_ports: MOCK_PORTS,
        watchdog_enabled: false,
        reboot_cause: RebootCause {
            kind: RebootCauseKind::NonHardware,
            description: "User issued 'reboot' command".to_string(),
        },
    }
}

// Handler functions

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    let data = serde_json::json!({
        "service": "DB-MVTX9180 Platform API Server",
        "status": "ok",
        "version": "0.1.0-test"
    });
    Json(ApiResponse::success(data))
}

async fn info_handler() -> Json<ApiResponse<InfoResponse>> {
    Json(ApiResponse::success(sample_info()))
}

async fn fans_handler() -> Json<ApiResponse<FansResponse>> {
    Json(ApiResponse::success(sample_fans()))
}

async fn thermals_handler() -> Json<ApiResponse<ThermalsResponse>> {
    Json(ApiResponse::success(sample_thermals()))
}

async fn components_handler() -> Json<ApiResponse<ComponentsResponse>> {
    Json(ApiResponse::success(ComponentsResponse {
        components: vec![
            ComponentInfo {
                name: "BIOS".to_string(),
                description: "Basic Input/Output System".to_string(),
                firmware_version: Some("1.02".to_string()),
            },
            ComponentInfo {
                name: "SysFPGA".to_string(),
                description: "System FPGA".to_string(),
                firmware_version: Some("0x13".to_string()),
            },
        ],
    }))
}

async fn watchdog_handler(State(state): State<MockServerState>) -> Json<ApiResponse<WatchdogStatus>> {
    let timeout = *state.watchdog.lock().unwrap();
    Json(ApiResponse::success(WatchdogStatus {
        available: true,
        armed: timeout.is_some(),
        remaining_secs: timeout.map(|t| t as i32).unwrap_or(-1),
        timeout_secs: timeout.unwrap_or(0),
    }))
}

async fn arm_handler(
    Query(params): Query<ArmQuery>,
    State(state): State<MockServerState>,
) -> Result<Json<ApiResponse<WatchdogArmResponse>>, StatusCode> {
    if params.seconds > 340 {
        return Err(StatusCode::BAD_REQUEST);
    }
    *state.watchdog.lock().unwrap() = Some(params.seconds);
    Ok(Json(ApiResponse::success(WatchdogArmResponse {
        timeout_secs: params.seconds,
    })))
}

async fn disarm_handler(State(state): State<MockServerState>) -> Json<ApiResponse<()>> {
    *state.watchdog.lock().unwrap() = None;
    Json(ApiResponse::success(()))
}

async fn presence_handler(
    Path(port): Path<usize>,
    State(state): State<MockServerState>,
) -> (StatusCode, Json<ApiResponse<SfpPresenceResponse>>) {
    if port >= MOCK_PORTS {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "SFP index {} out of range (0-{})",
                port,
                MOCK_PORTS - 1
            ))),
        );
    }
    let present = state.present.lock().unwrap().contains(&port);
    (
        StatusCode::OK,
        Json(ApiResponse::success(SfpPresenceResponse { port, present })),
    )
}

async fn events_handler(State(state): State<MockServerState>) -> Json<ApiResponse<SfpEventsResponse>> {
    let events = state.events.lock().unwrap().clone();
    Json(ApiResponse::success(SfpEventsResponse { events }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let server = MockServer::new();
        let (server, url) = server.start().await.unwrap();

        assert!(server.port() > 0);
        assert!(url.contains(&server.port().to_string()));

        let client = reqwest::Client::new();
        let response = client.get(&url).send().await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_out_of_range_port_uses_error_envelope() {
        let (_, url) = MockServer::new().start().await.unwrap();

        let response = reqwest::get(format!("{}/api/v0/sfp/40", url))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let json: ApiResponse<SfpPresenceResponse> = response.json().await.unwrap();
        assert!(matches!(json, ApiResponse::Error { .. }));
    }
}
