//! Platform configuration loaded once at startup
//!
//! Carries the values the inventory framework's plugin data provides on a
//! stock image: calibration constants, value maps, the PSU support list and
//! the sysfs locations of the devices. Every field has a default so a partial
//! file (or no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::psu_catalog::{PsuCatalog, PsuModelEntry};
use crate::board::{FPGA_DEV_ADDR, FPGA_I2C_BUS, WATCHDOG_MAX_TIMEOUT_SECS};
use crate::error::{PlatformError, Result};
use crate::types::FanDirection;

/// Largest percentage that may be added on top of a fan's max RPM
const MAX_SPEED_TOLERANCE_PERCENT: u32 = 100;

/// Platform identification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSection {
    /// Chassis name reported to clients
    pub name: String,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            name: "DB-MVTX9180".to_string(),
        }
    }
}

/// REST server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 9180,
        }
    }
}

/// Location of the system FPGA on the I2C bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FpgaConfig {
    pub i2c_bus: u8,
    pub address: u8,
}

impl Default for FpgaConfig {
    fn default() -> Self {
        Self {
            i2c_bus: FPGA_I2C_BUS,
            address: FPGA_DEV_ADDR,
        }
    }
}

/// Chassis fan calibration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    /// Number of fan drawers
    pub drawer_count: usize,
    /// Fans in each drawer
    pub fans_per_drawer: usize,
    /// Max RPM of inlet fans (even fan index)
    pub inlet_max_speed: u32,
    /// Max RPM of exhaust fans (odd fan index)
    pub exhaust_max_speed: u32,
    /// Percentage added on top of the max RPM
    pub max_speed_tolerance: u32,
    /// Presence value map: "1" (spinning) / "0" (stopped) to presence
    pub present_valmap: BTreeMap<String, bool>,
    /// Direction value map: "0" (even index) / "1" (odd index) to airflow
    pub direction_valmap: BTreeMap<String, FanDirection>,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            drawer_count: 4,
            fans_per_drawer: 2,
            inlet_max_speed: 23000,
            exhaust_max_speed: 20500,
            max_speed_tolerance: 10,
            present_valmap: BTreeMap::from([("1".to_string(), true), ("0".to_string(), false)]),
            direction_valmap: BTreeMap::from([
                ("0".to_string(), FanDirection::Intake),
                ("1".to_string(), FanDirection::Exhaust),
            ]),
        }
    }
}

impl FanConfig {
    /// Total number of chassis fans
    pub fn fan_count(&self) -> usize {
        self.drawer_count * self.fans_per_drawer
    }
}

/// Power supply configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PsuConfig {
    /// Number of PSU slots
    pub count: usize,
    /// Fans in each PSU
    pub fans_per_psu: usize,
    /// Max fan RPM for PSUs missing from the support list
    pub default_max_speed: u32,
    /// Supported PSU models
    pub models: Vec<PsuModelEntry>,
}

impl Default for PsuConfig {
    fn default() -> Self {
        Self {
            count: 2,
            fans_per_psu: 1,
            default_max_speed: 18000,
            models: Vec::new(),
        }
    }
}

impl PsuConfig {
    /// Build the keyed PSU catalog from the configured support list
    pub fn catalog(&self) -> PsuCatalog {
        PsuCatalog::new(&self.models, self.default_max_speed)
    }
}

/// Temperature sensor calibration.
///
/// `celsius = (raw * gain + offset) / 1000`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    pub gain: f64,
    pub offset: f64,
    /// Number of chassis temperature sensors
    pub sensor_count: usize,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            gain: 1000.0,
            offset: 0.0,
            sensor_count: 3,
        }
    }
}

/// Transceiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XcvrConfig {
    /// Number of front-panel transceiver ports
    pub num_ports: usize,
}

impl Default for XcvrConfig {
    fn default() -> Self {
        Self { num_ports: 32 }
    }
}

/// Hardware watchdog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Arm the watchdog and keep it fed while the daemon runs
    pub enabled: bool,
    /// Watchdog character device
    pub device: PathBuf,
    /// sysfs directory exposing `state`, `timeout` and `timeleft`
    pub sysfs_dir: PathBuf,
    /// Timeout to arm with, in seconds (0-340)
    pub timeout_secs: u32,
    /// Interval between keepalives, in seconds
    pub keepalive_interval_secs: u64,
    /// Disarm the watchdog on graceful shutdown
    pub disarm_on_shutdown: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            device: PathBuf::from("/dev/watchdog1"),
            sysfs_dir: PathBuf::from("/sys/class/watchdog/watchdog1"),
            timeout_secs: 180,
            keepalive_interval_secs: 60,
            disarm_on_shutdown: true,
        }
    }
}

/// Plain-text files read by the chassis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub reboot_cause: PathBuf,
    pub bios_version: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            reboot_cause: PathBuf::from("/host/reboot-cause/reboot-cause.txt"),
            bios_version: PathBuf::from("/sys/class/dmi/id/bios_version"),
        }
    }
}

/// sysfs path templates of the inventory framework.
///
/// `{port}` is the 1-based port number, `{psu}` the 1-based PSU number and
/// `{attr}` the attribute name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub sfp_presence: String,
    pub psu_attr: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            sfp_presence: "/sys/kernel/pddf/devices/xcvr/PORT{port}/xcvr_present".to_string(),
            psu_attr: "/sys/kernel/pddf/devices/psu/data/PSU{psu}/{attr}".to_string(),
        }
    }
}

/// Transceiver monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Timeout of each blocking wait for changes, in milliseconds
    pub poll_timeout_ms: i64,
    /// Number of events retained for clients
    pub event_log_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 1000,
            event_log_capacity: 256,
        }
    }
}

/// Platform configuration for the DB-MVTX9180.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub platform: PlatformSection,
    pub server: ServerConfig,
    pub fpga: FpgaConfig,
    pub fan: FanConfig,
    pub psu: PsuConfig,
    pub thermal: ThermalConfig,
    pub xcvr: XcvrConfig,
    pub watchdog: WatchdogConfig,
    pub paths: PathsConfig,
    pub inventory: InventoryConfig,
    pub monitor: MonitorConfig,
}

impl PlatformConfig {
    /// Parse PlatformConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize PlatformConfig to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PlatformError::Config(e.to_string()))
    }

    /// Check values the hardware layer relies on
    pub fn validate(&self) -> Result<()> {
        if self.watchdog.timeout_secs > WATCHDOG_MAX_TIMEOUT_SECS {
            return Err(PlatformError::Config(format!(
                "watchdog.timeout_secs must be 0-{}, got {}",
                WATCHDOG_MAX_TIMEOUT_SECS, self.watchdog.timeout_secs
            )));
        }
        if self.watchdog.keepalive_interval_secs == 0 {
            return Err(PlatformError::Config(
                "watchdog.keepalive_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.watchdog.enabled {
            if self.watchdog.timeout_secs == 0 {
                return Err(PlatformError::Config(
                    "watchdog.timeout_secs must be greater than 0 when the watchdog is enabled"
                        .to_string(),
                ));
            }
            if self.watchdog.keepalive_interval_secs >= u64::from(self.watchdog.timeout_secs) {
                return Err(PlatformError::Config(format!(
                    "watchdog.keepalive_interval_secs ({}) must be shorter than watchdog.timeout_secs ({})",
                    self.watchdog.keepalive_interval_secs, self.watchdog.timeout_secs
                )));
            }
        }
        if self.fan.max_speed_tolerance > MAX_SPEED_TOLERANCE_PERCENT {
            return Err(PlatformError::Config(format!(
                "fan.max_speed_tolerance must be 0-{}, got {}",
                MAX_SPEED_TOLERANCE_PERCENT, self.fan.max_speed_tolerance
            )));
        }
        if self.fan.inlet_max_speed == 0 || self.fan.exhaust_max_speed == 0 {
            return Err(PlatformError::Config(
                "fan max speeds must be greater than 0".to_string(),
            ));
        }
        if self.psu.default_max_speed == 0 {
            return Err(PlatformError::Config(
                "psu.default_max_speed must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
