//! API models for the platform REST API
//!
//! This module contains request and response models shared by the daemon and
//! the CLI.

use crate::types::{FanDirection, PresenceCode, RebootCause};
use serde::{Deserialize, Serialize};

/// Generic API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ApiResponse<T> {
    #[serde(rename = "success")]
    Success { data: T },
    #[serde(rename = "error")]
    Error { error: String },
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    /// Create an error response
    pub fn error(error: String) -> Self {
        Self::Error { error }
    }
}

/// Daemon and chassis information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    /// Daemon version
    pub version: String,
    /// Chassis name
    pub platform: String,
    /// Whether the daemon runs against simulated hardware
    pub mock: bool,
    /// Daemon uptime in seconds
    pub uptime: u64,
    /// Number of transceiver ports
    pub num_ports: usize,
    /// Whether the daemon keeps the hardware watchdog fed
    pub watchdog_enabled: bool,
    /// Cause of the previous reboot
    pub reboot_cause: RebootCause,
}

/// Status of a single fan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanStatus {
    /// Fan name, e.g. "Fantray2_Fan1" or "PSU1_Fan1"
    pub name: String,
    /// Whether the fan belongs to a power supply
    pub psu_fan: bool,
    pub present: bool,
    pub rpm: u32,
    /// Speed as a percentage of the max speed
    pub speed_percent: u32,
    pub max_speed: u32,
    pub direction: FanDirection,
}

/// All fans in the chassis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FansResponse {
    pub fans: Vec<FanStatus>,
}

/// Status of a single temperature sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalStatus {
    pub name: String,
    pub label: String,
    /// Current temperature in Celsius, absent when no valid reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_recorded: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recorded: Option<f64>,
    /// Absent when the sensor has no threshold support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_critical_threshold: Option<f64>,
}

/// All temperature sensors in the chassis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalsResponse {
    pub thermals: Vec<ThermalStatus>,
}

/// Firmware component information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
}

/// All firmware components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentsResponse {
    pub components: Vec<ComponentInfo>,
}

/// Hardware watchdog status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogStatus {
    /// Whether the watchdog device could be loaded
    pub available: bool,
    pub armed: bool,
    /// Seconds before expiry, -1 when disarmed
    pub remaining_secs: i32,
    /// Timeout last applied to the hardware
    pub timeout_secs: u32,
}

/// Result of arming the watchdog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogArmResponse {
    /// Timeout reported back by the hardware
    pub timeout_secs: u32,
}

/// Presence of a single transceiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SfpPresenceResponse {
    /// 0-based port index
    pub port: usize,
    pub present: bool,
}

/// A transceiver insertion or removal recorded by the monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfpEventRecord {
    /// Milliseconds since the Unix epoch when the change was detected
    pub timestamp_ms: u64,
    /// 0-based port index
    pub port: usize,
    pub event: PresenceCode,
}

/// Recent transceiver events, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SfpEventsResponse {
    pub events: Vec<SfpEventRecord>,
}
