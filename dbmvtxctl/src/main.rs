//! DB-MVTX9180 CLI
//!
//! Command-line interface for the platform daemon.

use anyhow::Result;
use clap::Parser;
use dbmvtxctl::cli::{
    generate_completion, handle_components, handle_config, handle_fans, handle_health,
    handle_info, handle_sfp, handle_thermals, handle_watchdog, Cli, Commands, OutputFormat,
};
use dbmvtxctl::client::PlatformClient;
use dbmvtxctl::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build configuration using priority chain: defaults → file → env → CLI args
    let mut builder = CliConfig::builder().with_config_file(!cli.no_config);

    // Apply environment variable overrides
    builder = builder.with_env_overrides();

    // Apply CLI argument overrides (highest priority)
    if let Some(ref server) = cli.server {
        builder = builder.with_server_url(server)?;
    }
    if let Some(ref format) = cli.format {
        let format_str = match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        builder = builder.with_output_format(format_str)?;
    }
    if let Some(verbose) = cli.verbose {
        builder = builder.with_verbose(verbose);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let output_format = match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };
    let verbose = config.verbose;

    if verbose {
        eprintln!("Verbose mode enabled");
        eprintln!("Server URL: {}", config.server_url);
        eprintln!("Output format: {:?}", output_format);
    }

    let client = PlatformClient::with_config(
        config.server_url.clone(),
        config.timeout,
        3,
        std::time::Duration::from_millis(500),
    )?;

    let result = match cli.command {
        Commands::Info => handle_info(&client, &output_format).await,
        Commands::Fans => handle_fans(&client, &output_format).await,
        Commands::Thermals => handle_thermals(&client, &output_format).await,
        Commands::Components => handle_components(&client, &output_format).await,
        Commands::Watchdog { command } => handle_watchdog(&client, command, &output_format).await,
        Commands::Sfp { command } => handle_sfp(&client, command, &output_format).await,
        Commands::Health => handle_health(&client, &output_format).await,
        Commands::Config { command } => handle_config(command, &config, &output_format).await,
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
