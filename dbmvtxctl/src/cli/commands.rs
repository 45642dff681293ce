//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};

/// DB-MVTX9180 Platform CLI
#[derive(Parser, Debug)]
#[command(name = "dbmvtxctl")]
#[command(version, about = "DB-MVTX9180 Platform CLI", long_about = None)]
pub struct Cli {
    /// Server URL (overrides config file)
    #[arg(short, long)]
    pub server: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long)]
    pub verbose: Option<bool>,

    /// Don't load config file
    #[arg(long)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show platform and daemon information
    Info,

    /// Show chassis and PSU fans
    Fans,

    /// Show temperature sensors
    Thermals,

    /// Show firmware components and versions
    Components,

    /// Hardware watchdog commands
    Watchdog {
        #[command(subcommand)]
        command: WatchdogCommands,
    },

    /// Transceiver commands
    Sfp {
        #[command(subcommand)]
        command: SfpCommands,
    },

    /// Check server connectivity and health
    Health,

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchdogCommands {
    /// Show watchdog state
    Status,

    /// Arm the watchdog, or feed it when already armed
    Arm {
        /// Timeout in seconds (0-340)
        seconds: u32,
    },

    /// Disarm the watchdog
    Disarm,
}

#[derive(Subcommand, Debug)]
pub enum SfpCommands {
    /// Show whether a module is plugged into a port
    Presence {
        /// Port index (0-based)
        port: usize,
    },

    /// Show recent insertion and removal events
    Events,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}
