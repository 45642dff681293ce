//! Core types and data structures for the platform

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Manufacturer ID reported by a PSU whose FRU data cannot be read
pub const FRU_NOT_AVAILABLE: &str = "not available";

/// Presence state of a hot-pluggable transceiver module.
///
/// Serialized as the event codes used in change notifications:
/// `"1"` for an inserted module, `"0"` for a removed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceCode {
    #[serde(rename = "1")]
    Inserted,
    #[serde(rename = "0")]
    Removed,
}

impl PresenceCode {
    /// Map a presence boolean to a presence code
    pub fn from_present(present: bool) -> Self {
        if present {
            PresenceCode::Inserted
        } else {
            PresenceCode::Removed
        }
    }

    /// Event code string for this state
    pub fn as_code(&self) -> &'static str {
        match self {
            PresenceCode::Inserted => "1",
            PresenceCode::Removed => "0",
        }
    }
}

impl fmt::Display for PresenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceCode::Inserted => write!(f, "inserted"),
            PresenceCode::Removed => write!(f, "removed"),
        }
    }
}

/// Changed transceiver ports, keyed by 0-based port index
pub type PortEvents = BTreeMap<usize, PresenceCode>;

/// Chassis change events grouped by device type.
///
/// Only transceivers are reported on this platform, so the envelope has a
/// single `sfp` entry, e.g. `{"sfp": {"11": "0", "12": "1"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvents {
    pub sfp: PortEvents,
}

impl ChangeEvents {
    pub fn is_empty(&self) -> bool {
        self.sfp.is_empty()
    }
}

/// Airflow direction of a fan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanDirection {
    #[serde(rename = "intake", alias = "INTAKE")]
    Intake,
    #[serde(rename = "exhaust", alias = "EXHAUST")]
    Exhaust,
    #[serde(rename = "N/A", alias = "NOT_APPLICABLE")]
    NotApplicable,
}

impl fmt::Display for FanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanDirection::Intake => write!(f, "intake"),
            FanDirection::Exhaust => write!(f, "exhaust"),
            FanDirection::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Predefined reboot cause categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebootCauseKind {
    /// Software-initiated reboot; the description carries the recorded cause
    #[serde(rename = "REBOOT_CAUSE_NON_HARDWARE")]
    NonHardware,
    #[serde(rename = "REBOOT_CAUSE_POWER_LOSS")]
    PowerLoss,
    #[serde(rename = "REBOOT_CAUSE_WATCHDOG")]
    Watchdog,
    #[serde(rename = "REBOOT_CAUSE_HARDWARE_OTHER")]
    HardwareOther,
}

impl fmt::Display for RebootCauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RebootCauseKind::NonHardware => "REBOOT_CAUSE_NON_HARDWARE",
            RebootCauseKind::PowerLoss => "REBOOT_CAUSE_POWER_LOSS",
            RebootCauseKind::Watchdog => "REBOOT_CAUSE_WATCHDOG",
            RebootCauseKind::HardwareOther => "REBOOT_CAUSE_HARDWARE_OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Cause of the previous reboot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootCause {
    pub kind: RebootCauseKind,
    pub description: String,
}

/// Field-replaceable-unit identity of a power supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsuFru {
    pub mfr_id: String,
    pub model: String,
}

impl PsuFru {
    /// FRU record for a PSU whose EEPROM could not be read
    pub fn not_available() -> Self {
        Self {
            mfr_id: FRU_NOT_AVAILABLE.to_string(),
            model: FRU_NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.mfr_id != FRU_NOT_AVAILABLE
    }
}
