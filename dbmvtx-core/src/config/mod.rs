//! Configuration types for the platform
//!
//! This module provides the configuration data structures shared by the
//! hardware layer and the daemon.
//!
//! # Architecture
//!
//! - [`PlatformConfig`] - calibration, value maps and device locations, loaded once at startup
//! - [`PsuCatalog`] - keyed lookup of supported PSU models built from the configuration

mod paths;
mod platform_config;
mod psu_catalog;

pub use paths::default_config_path;
pub use platform_config::{
    FanConfig, FpgaConfig, InventoryConfig, MonitorConfig, PathsConfig, PlatformConfig,
    PlatformSection, PsuConfig, ServerConfig, ThermalConfig, WatchdogConfig, XcvrConfig,
};
pub use psu_catalog::{PsuCatalog, PsuModel, PsuModelEntry};
