//! Command execution handlers

use anyhow::Result;

use crate::client::PlatformClient;
use crate::config::CliConfig;
use crate::format::{self, format_success};

use super::commands::*;

/// Handle info command
pub async fn handle_info(client: &PlatformClient, format: &OutputFormat) -> Result<()> {
    let info = client.get_info().await?;
    println!("{}", format::format_info(&info, &format.into())?);
    Ok(())
}

/// Handle fans command
pub async fn handle_fans(client: &PlatformClient, format: &OutputFormat) -> Result<()> {
    let fans = client.get_fans().await?;
    println!("{}", format::format_fans(&fans, &format.into())?);
    Ok(())
}

/// Handle thermals command
pub async fn handle_thermals(client: &PlatformClient, format: &OutputFormat) -> Result<()> {
    let thermals = client.get_thermals().await?;
    println!("{}", format::format_thermals(&thermals, &format.into())?);
    Ok(())
}

/// Handle components command
pub async fn handle_components(client: &PlatformClient, format: &OutputFormat) -> Result<()> {
    let components = client.get_components().await?;
    println!("{}", format::format_components(&components, &format.into())?);
    Ok(())
}

/// Handle health command
pub async fn handle_health(client: &PlatformClient, format: &OutputFormat) -> Result<()> {
    let health = client.health_check().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        OutputFormat::Table => {
            println!("Server Health Check ({}):", client.base_url());
            println!("{:<20} Value", "Status");
            println!("{}", "-".repeat(40));

            for (key, value) in &health {
                let value_str = match value {
                    serde_json::Value::Bool(b) => {
                        if *b { "✓".to_string() } else { "✗".to_string() }
                    }
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => value.to_string(),
                };
                println!("{:<20} {}", key, value_str);
            }
        }
    }

    Ok(())
}

/// Handle watchdog commands
pub async fn handle_watchdog(
    client: &PlatformClient,
    command: WatchdogCommands,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        WatchdogCommands::Status => {
            let status = client.get_watchdog().await?;
            println!("{}", format::format_watchdog(&status, &format.into())?);
        }
        WatchdogCommands::Arm { seconds } => {
            let armed = client.arm_watchdog(seconds).await?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&armed)?);
                }
                OutputFormat::Table => {
                    println!(
                        "{}",
                        format_success(&format!(
                            "Watchdog armed ({}s timeout)",
                            armed.timeout_secs
                        ))
                    );
                }
            }
        }
        WatchdogCommands::Disarm => {
            client.disarm_watchdog().await?;
            println!("{}", format_success("Watchdog disarmed"));
        }
    }

    Ok(())
}

/// Handle transceiver commands
pub async fn handle_sfp(
    client: &PlatformClient,
    command: SfpCommands,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        SfpCommands::Presence { port } => {
            let presence = client.get_sfp_presence(port).await?;
            println!("{}", format::format_sfp_presence(&presence, &format.into())?);
        }
        SfpCommands::Events => {
            let events = client.get_sfp_events().await?;
            println!("{}", format::format_sfp_events(&events, &format.into())?);
        }
    }

    Ok(())
}

/// Handle config commands
pub async fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(current_config)?);
            }
            OutputFormat::Table => {
                println!("CLI Configuration:");
                println!("{:<20} Value", "Setting");
                println!("{}", "-".repeat(40));
                println!("{:<20} {}", "Server URL", current_config.server_url);
                println!("{:<20} {}", "Output Format", current_config.output_format);
                println!("{:<20} {}", "Verbose", current_config.verbose);
                println!("{:<20} {}s", "Timeout", current_config.timeout);
            }
        },
        ConfigCommands::Set { key, value } => {
            // Only the file is updated; env and flags still win at runtime
            let mut config = CliConfig::load()?;
            apply_setting(&mut config, &key, &value)?;
            config.save()?;
            println!("{}", format_success(&format!("Set {} = {}", key, value)));
        }
        ConfigCommands::Reset => {
            CliConfig::default().save()?;
            println!("{}", format_success("Configuration reset to defaults"));
        }
    }

    Ok(())
}

/// Update one configuration key
fn apply_setting(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    let mut builder = CliConfig::builder().with_file(config.clone());
    builder = match key {
        "server_url" => builder.with_server_url(value)?,
        "output_format" => builder.with_output_format(value)?,
        "verbose" => builder.with_verbose(value.to_lowercase() == "true" || value == "1"),
        "timeout" => builder.with_timeout(
            value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid timeout value. Must be a number"))?,
        )?,
        _ => return Err(anyhow::anyhow!("Unknown config key: {}", key)),
    };
    *config = builder.build()?;
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
