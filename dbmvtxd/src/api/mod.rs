//! API module for the platform daemon
//!
//! Contains the REST API implementation with Axum router and handlers.

pub(crate) mod handlers;

use crate::monitor::EventLog;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use dbmvtx_hardware::Chassis;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub(crate) struct AppState {
    /// Chassis; hardware access is serialized through this lock
    pub chassis: Arc<Mutex<Chassis>>,
    /// Transceiver events recorded by the monitor thread
    pub events: Arc<EventLog>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Running against simulated hardware
    pub mock: bool,
}

impl AppState {
    /// Create new application state
    pub fn new(chassis: Arc<Mutex<Chassis>>, events: Arc<EventLog>, mock: bool) -> Self {
        Self {
            chassis,
            events,
            start_time: Instant::now(),
            mock,
        }
    }

    /// Run `f` against the chassis on the blocking thread pool.
    ///
    /// Register reads spawn `i2cget` and sysfs reads block, so hardware work
    /// stays off the async workers. The chassis lock is held for the whole call.
    pub async fn with_chassis<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Chassis) -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut chassis = self.chassis.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut chassis))
            .await
            .map_err(|e| ApiError::internal_error(format!("Hardware task failed: {}", e)))
    }
}

/// Create the main API router with all endpoints
pub(crate) fn create_router(state: AppState) -> Router {
    info!("Setting up API router...");

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET])
        .allow_headers(tower_http::cors::Any);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Router::new()
        // Sensors and inventory
        .route("/api/v0/fans", get(handlers::fans::get_fans))
        .route("/api/v0/thermals", get(handlers::thermals::get_thermals))
        .route(
            "/api/v0/components",
            get(handlers::components::get_components),
        )
        // Watchdog endpoints
        .route("/api/v0/watchdog", get(handlers::watchdog::get_status))
        .route("/api/v0/watchdog/arm", get(handlers::watchdog::arm))
        .route("/api/v0/watchdog/disarm", get(handlers::watchdog::disarm))
        // Transceiver endpoints
        .route("/api/v0/sfp/events", get(handlers::sfp::get_events))
        .route("/api/v0/sfp/:port", get(handlers::sfp::get_presence))
        // System info endpoint
        .route("/api/v0/info", get(handlers::info::get_info))
        // Root endpoint
        .route("/", get(handlers::info::root))
        .layer(middleware_stack)
        .with_state(state)
}

/// Error handling utilities
pub(crate) mod error {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use dbmvtx_core::api::ApiResponse;
    use dbmvtx_core::PlatformError;

    use tracing::error;

    /// Custom error type for API responses
    #[derive(Debug)]
    pub struct ApiError {
        pub status_code: StatusCode,
        pub message: String,
    }

    impl ApiError {
        /// Create a new API error
        pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
            Self {
                status_code,
                message: message.into(),
            }
        }

        /// Create a bad request error
        pub fn bad_request(message: impl Into<String>) -> Self {
            Self::new(StatusCode::BAD_REQUEST, message)
        }

        pub fn not_found(message: impl Into<String>) -> Self {
            Self::new(StatusCode::NOT_FOUND, message)
        }

        /// Create an internal server error
        pub fn internal_error(message: impl Into<String>) -> Self {
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }

        pub fn not_implemented(message: impl Into<String>) -> Self {
            Self::new(StatusCode::NOT_IMPLEMENTED, message)
        }

        /// Create a service unavailable error (for hardware issues)
        pub fn service_unavailable(message: impl Into<String>) -> Self {
            Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
        }
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            error!("API Error {}: {}", self.status_code, self.message);

            let response: ApiResponse<()> = ApiResponse::error(self.message);

            (self.status_code, Json(response)).into_response()
        }
    }

    /// Convert PlatformError to ApiError
    impl From<PlatformError> for ApiError {
        fn from(err: PlatformError) -> Self {
            match err {
                PlatformError::InvalidInput(msg) => Self::bad_request(msg),
                PlatformError::OutOfRange { .. } => Self::not_found(err.to_string()),
                PlatformError::NotSupported(_) => Self::not_implemented(err.to_string()),
                PlatformError::Register { .. }
                | PlatformError::Watchdog(_)
                | PlatformError::Io(_) => Self::service_unavailable(err.to_string()),
                _ => Self::internal_error(err.to_string()),
            }
        }
    }

}

/// Helper macros for common responses
#[macro_export]
macro_rules! api_ok {
    ($data:expr) => {
        Ok(axum::Json(dbmvtx_core::api::ApiResponse::success($data)))
    };
}

#[macro_export]
macro_rules! api_fail {
    ($message:expr) => {
        Err($crate::api::error::ApiError::bad_request($message))
    };
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use dbmvtx_core::{FanDirection, PlatformConfig, PsuModelEntry};
    use dbmvtx_hardware::mock::{simulated_platform, ManualClock, MemoryBus, MemoryInventory};
    use http_body_util::BodyExt;

    pub(crate) struct TestApp {
        pub state: AppState,
        pub bus: Arc<MemoryBus>,
        pub inventory: Arc<MemoryInventory>,
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_config(test_config())
        }

        pub fn with_config(config: PlatformConfig) -> Self {
            let capacity = config.monitor.event_log_capacity;
            let (ctx, bus, inventory) = simulated_platform(config);
            let chassis = Chassis::with_clock(ctx, Arc::new(ManualClock::new()));
            let state = AppState::new(
                Arc::new(Mutex::new(chassis)),
                Arc::new(EventLog::new(capacity)),
                true,
            );
            Self {
                state,
                bus,
                inventory,
            }
        }

        pub fn router(&self) -> Router {
            create_router(self.state.clone())
        }
    }

    pub(crate) fn test_config() -> PlatformConfig {
        let mut config = PlatformConfig::default();
        config.psu.models.push(PsuModelEntry {
            manufacturer: "DELTA".to_string(),
            model: "DPS-550AB".to_string(),
            max_speed: 21000,
            direction: FanDirection::Exhaust,
        });
        config.paths.reboot_cause = "/nonexistent/reboot-cause.txt".into();
        config.paths.bios_version = "/nonexistent/bios_version".into();
        config.watchdog.sysfs_dir = "/nonexistent/watchdog1".into();
        config
    }

    pub(crate) async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
