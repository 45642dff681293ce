//! API request handlers for the platform daemon REST API.
//!
//! # Handler Modules
//!
//! - [`info`] - Daemon/chassis information and root endpoint
//! - [`fans`] - Chassis and PSU fan readings
//! - [`thermals`] - Temperature sensors and thresholds
//! - [`components`] - Firmware component versions
//! - [`watchdog`] - Hardware watchdog status and control
//! - [`sfp`] - Transceiver presence and recorded insertion/removal events
//!
//! All handlers accept `State<AppState>`, return
//! `Result<Json<ApiResponse<T>>, ApiError>` and run hardware access through
//! [`AppState::with_chassis`](crate::api::AppState::with_chassis).

pub mod components;
pub mod fans;
pub mod info;
pub mod sfp;
pub mod thermals;
pub mod watchdog;
