//! DB-MVTX9180 Platform Server
//!
//! REST API server exposing the fans, temperature sensors, firmware
//! components, transceiver ports and hardware watchdog of the switch.
//!
//! # Background work
//!
//! - The transceiver monitor polls port presence on its own thread and
//!   records insertions and removals for `GET /api/v0/sfp/events`.
//! - When `[watchdog] enabled = true`, a keepalive task arms the hardware
//!   watchdog and feeds it until shutdown, where it is disarmed again.

mod api;
mod config;
mod keepalive;
mod monitor;
mod shutdown;

use anyhow::Result;
use api::AppState;
use clap::Parser;
use dbmvtx_core::default_config_path;
use dbmvtx_hardware::mock::simulated_platform;
use dbmvtx_hardware::{Chassis, HardwareContext, SystemClock, TransceiverMonitor};
use monitor::EventLog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// DB-MVTX9180 Platform Server
#[derive(Parser, Debug)]
#[command(name = "dbmvtxd")]
#[command(version, about = "DB-MVTX9180 Platform API Server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server bind address (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable mock mode (run against simulated hardware)
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose);

    info!("DB-MVTX9180 platform server starting...");

    // Determine config path: CLI flag > env var > default
    let config_path = args.config.unwrap_or_else(|| {
        std::env::var("DBMVTX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });
    info!("Configuration file: {}", config_path.display());

    // Step 1: Load configuration
    let platform_config = config::load(&config_path).await?;
    info!("Configuration loaded successfully");

    let bind = args
        .bind
        .unwrap_or_else(|| platform_config.server.bind.clone());
    let port = args.port.unwrap_or(platform_config.server.port);
    let bind_addr = format!("{}:{}", bind, port);
    let watchdog_config = platform_config.watchdog.clone();
    let monitor_config = platform_config.monitor.clone();

    // Step 2: Build the chassis
    let ctx = if args.mock {
        info!("Mock mode: using simulated hardware");
        let (ctx, _, _) = simulated_platform(platform_config);
        ctx
    } else {
        info!(
            "FPGA at bus {} address {:#04x}",
            platform_config.fpga.i2c_bus, platform_config.fpga.address
        );
        HardwareContext::from_config(platform_config)
    };
    let chassis = Chassis::new(ctx);
    info!(
        "Chassis {}: {} fans, {} thermals, {} transceiver ports",
        chassis.name(),
        chassis.all_fans().count(),
        chassis.thermals().len() + chassis.psu_thermals().len(),
        chassis.num_sfps()
    );

    let reboot_cause = chassis.reboot_cause();
    info!(
        "Last reboot cause: {:?} ({})",
        reboot_cause.kind, reboot_cause.description
    );

    // Step 3: Start background work
    let events = Arc::new(EventLog::new(monitor_config.event_log_capacity));
    let transceiver_monitor = TransceiverMonitor::for_inventory(
        chassis.context().inventory.clone(),
        chassis.num_sfps(),
        Arc::new(SystemClock),
    );
    let monitor_handle = monitor::spawn(
        transceiver_monitor,
        events.clone(),
        monitor_config.poll_timeout_ms,
    )?;

    let chassis = Arc::new(Mutex::new(chassis));

    let keepalive_handle = if watchdog_config.enabled && !args.mock {
        match keepalive::start(
            chassis.clone(),
            watchdog_config.timeout_secs,
            Duration::from_secs(watchdog_config.keepalive_interval_secs),
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start watchdog keepalive: {}", e);
                None
            }
        }
    } else {
        info!("Watchdog keepalive disabled");
        None
    };

    // Clone for shutdown handler
    let chassis_for_shutdown = chassis.clone();
    let is_mock = args.mock;

    // Step 4: Create application state
    let app_state = AppState::new(chassis, events, args.mock);

    // Set up API router
    let app = api::create_router(app_state);

    // Start server
    info!("Starting server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Platform API Server listening on {}", bind_addr);
    info!("Server ready!");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            if let Some(handle) = keepalive_handle {
                handle.abort();
            }
            shutdown::disarm_watchdog(&watchdog_config, &chassis_for_shutdown, is_mock).await;
        })
        .await?;

    if tokio::task::spawn_blocking(move || monitor_handle.stop())
        .await
        .is_err()
    {
        warn!("Failed to stop transceiver monitor");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
