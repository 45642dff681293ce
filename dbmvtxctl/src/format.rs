//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use dbmvtx_core::api::{
    ComponentsResponse, FansResponse, InfoResponse, SfpEventsResponse, SfpPresenceResponse,
    ThermalsResponse, WatchdogStatus,
};
use dbmvtx_core::PresenceCode;

use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

fn celsius(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Format info response
pub fn format_info(info: &InfoResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&format!("{} Platform Information", info.platform).bold().to_string());
            output.push('\n');
            output.push_str(&format!("Version: {}", info.version.cyan()));
            output.push('\n');
            output.push_str(&format!(
                "Hardware: {}",
                if info.mock {
                    "Simulated".yellow()
                } else {
                    "Physical".green()
                }
            ));
            output.push('\n');
            output.push_str(&format!(
                "Uptime: {} seconds",
                info.uptime.to_string().yellow()
            ));
            output.push('\n');
            output.push_str(&format!("Transceiver ports: {}", info.num_ports));
            output.push('\n');
            output.push_str(&format!(
                "Watchdog keepalive: {}",
                if info.watchdog_enabled {
                    "Enabled".green()
                } else {
                    "Disabled".dimmed()
                }
            ));
            output.push('\n');
            output.push_str(&format!(
                "Reboot cause: {} ({})",
                info.reboot_cause.kind.to_string().cyan(),
                info.reboot_cause.description
            ));

            Ok(output)
        }
    }
}

/// Format fans response
pub fn format_fans(fans: &FansResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fans)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct FanRow {
                #[tabled(rename = "Fan")]
                name: String,
                #[tabled(rename = "Present")]
                present: String,
                #[tabled(rename = "RPM")]
                rpm: String,
                #[tabled(rename = "Speed %")]
                percent: String,
                #[tabled(rename = "Max RPM")]
                max_speed: u32,
                #[tabled(rename = "Direction")]
                direction: String,
            }

            let rows: Vec<FanRow> = fans
                .fans
                .iter()
                .map(|fan| FanRow {
                    name: fan.name.clone(),
                    present: if fan.present {
                        "Yes".green().to_string()
                    } else {
                        "No".red().to_string()
                    },
                    rpm: if fan.rpm > 0 {
                        fan.rpm.to_string().green().to_string()
                    } else {
                        "0".red().to_string()
                    },
                    percent: format!("{}%", fan.speed_percent).cyan().to_string(),
                    max_speed: fan.max_speed,
                    direction: fan.direction.to_string(),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Fans:".bold(), table))
        }
    }
}

/// Format thermals response
pub fn format_thermals(thermals: &ThermalsResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(thermals)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ThermalRow {
                #[tabled(rename = "Sensor")]
                name: String,
                #[tabled(rename = "Label")]
                label: String,
                #[tabled(rename = "Temp °C")]
                temperature: String,
                #[tabled(rename = "Min")]
                min: String,
                #[tabled(rename = "Max")]
                max: String,
                #[tabled(rename = "High")]
                high: String,
                #[tabled(rename = "Critical")]
                critical: String,
            }

            let rows: Vec<ThermalRow> = thermals
                .thermals
                .iter()
                .map(|thermal| {
                    let over = matches!(
                        (thermal.temperature, thermal.high_threshold),
                        (Some(t), Some(h)) if t >= h
                    );
                    let temperature = celsius(thermal.temperature);
                    ThermalRow {
                        name: thermal.name.clone(),
                        label: thermal.label.clone(),
                        temperature: if over {
                            temperature.red().bold().to_string()
                        } else {
                            temperature.green().to_string()
                        },
                        min: celsius(thermal.min_recorded),
                        max: celsius(thermal.max_recorded),
                        high: celsius(thermal.high_threshold),
                        critical: celsius(thermal.high_critical_threshold),
                    }
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Thermals:".bold(), table))
        }
    }
}

/// Format components response
pub fn format_components(
    components: &ComponentsResponse,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(components)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ComponentRow {
                #[tabled(rename = "Component")]
                name: String,
                #[tabled(rename = "Description")]
                description: String,
                #[tabled(rename = "Firmware")]
                version: String,
            }

            let rows: Vec<ComponentRow> = components
                .components
                .iter()
                .map(|component| ComponentRow {
                    name: component.name.cyan().to_string(),
                    description: component.description.clone(),
                    version: component
                        .firmware_version
                        .clone()
                        .unwrap_or_else(|| "unknown".dimmed().to_string()),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Components:".bold(), table))
        }
    }
}

/// Format watchdog status
pub fn format_watchdog(status: &WatchdogStatus, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
        OutputFormat::Table => {
            if !status.available {
                return Ok(format!("Watchdog: {}", "Not available".red()));
            }

            let mut output = String::new();
            output.push_str(&"Watchdog Status".bold().to_string());
            output.push('\n');
            output.push_str(&format!(
                "Armed: {}",
                if status.armed {
                    "Yes".green()
                } else {
                    "No".yellow()
                }
            ));
            output.push('\n');
            output.push_str(&format!("Timeout: {} seconds", status.timeout_secs));
            if status.remaining_secs >= 0 {
                output.push('\n');
                output.push_str(&format!(
                    "Time left: {} seconds",
                    status.remaining_secs.to_string().cyan()
                ));
            }

            Ok(output)
        }
    }
}

/// Format transceiver presence
pub fn format_sfp_presence(
    presence: &SfpPresenceResponse,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(presence)?),
        OutputFormat::Table => Ok(format!(
            "Port {}: {}",
            presence.port,
            if presence.present {
                "present".green()
            } else {
                "empty".dimmed()
            }
        )),
    }
}

/// Format transceiver events
pub fn format_sfp_events(events: &SfpEventsResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(events)?),
        OutputFormat::Table => {
            if events.events.is_empty() {
                return Ok("No transceiver events recorded.".to_string());
            }

            #[derive(Tabled)]
            struct EventRow {
                #[tabled(rename = "Timestamp (ms)")]
                timestamp_ms: u64,
                #[tabled(rename = "Port")]
                port: usize,
                #[tabled(rename = "Event")]
                event: String,
            }

            let rows: Vec<EventRow> = events
                .events
                .iter()
                .map(|record| EventRow {
                    timestamp_ms: record.timestamp_ms,
                    port: record.port,
                    event: match record.event {
                        PresenceCode::Inserted => record.event.to_string().green().to_string(),
                        PresenceCode::Removed => record.event.to_string().red().to_string(),
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Transceiver Events:".bold(), table))
        }
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
