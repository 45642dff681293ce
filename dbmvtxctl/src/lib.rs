//! DB-MVTX9180 CLI Library
//!
//! This library provides the core functionality for the `dbmvtxctl` tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::PlatformClient`] which provides
//! programmatic access to the platform daemon. Configuration types are also
//! available via [`config::CliConfig`] and [`config::ConfigBuilder`].
//!
//! ```no_run
//! use dbmvtxctl::client::PlatformClient;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PlatformClient::with_config(
//!     "http://localhost:9180".to_string(),
//!     10,  // timeout in seconds
//!     3,   // max retries
//!     Duration::from_millis(500),  // initial retry delay
//! )?;
//!
//! let fans = client.get_fans().await?;
//! println!("{} fans", fans.fans.len());
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for communicating with the platform daemon.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
