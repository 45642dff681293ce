//! DB-MVTX9180 Core Library
//!
//! Shared types, static board tables, and configuration for the DB-MVTX9180
//! platform. This crate is used by the hardware layer, the daemon and the CLI.

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{default_config_path, PlatformConfig, PsuCatalog, PsuModelEntry};
pub use error::*;
pub use types::*;
