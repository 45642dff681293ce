//! Supported power supply models
//!
//! Maps a PSU's FRU identity (manufacturer, model) to its fan characteristics,
//! with a named default used when the PSU is not in the catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{FanDirection, PsuFru};

/// One supported PSU model, as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsuModelEntry {
    /// Manufacturer ID as reported by the PSU FRU
    pub manufacturer: String,
    /// Model name as reported by the PSU FRU
    pub model: String,
    /// Fan speed at 100%, in RPM
    pub max_speed: u32,
    /// Airflow direction of the PSU fan
    pub direction: FanDirection,
}

/// Fan characteristics of a supported PSU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsuModel {
    pub max_speed: u32,
    pub direction: FanDirection,
}

/// Keyed lookup of supported PSU models
#[derive(Debug, Clone)]
pub struct PsuCatalog {
    models: HashMap<(String, String), PsuModel>,
    default_max_speed: u32,
}

impl PsuCatalog {
    /// Build the catalog from configuration entries.
    ///
    /// Later entries with the same (manufacturer, model) replace earlier ones.
    pub fn new(entries: &[PsuModelEntry], default_max_speed: u32) -> Self {
        let models = entries
            .iter()
            .map(|e| {
                (
                    (e.manufacturer.clone(), e.model.clone()),
                    PsuModel {
                        max_speed: e.max_speed,
                        direction: e.direction,
                    },
                )
            })
            .collect();

        Self {
            models,
            default_max_speed,
        }
    }

    /// Catalog entry for a PSU, if its model is supported
    pub fn lookup(&self, fru: &PsuFru) -> Option<PsuModel> {
        self.models
            .get(&(fru.mfr_id.clone(), fru.model.clone()))
            .copied()
    }

    /// Max fan speed for a PSU, falling back to the default max speed
    pub fn max_speed(&self, fru: &PsuFru) -> u32 {
        self.lookup(fru)
            .map(|m| m.max_speed)
            .unwrap_or(self.default_max_speed)
    }

    /// Fan airflow direction for a PSU.
    ///
    /// `NotApplicable` when the FRU could not be read or the model is unknown.
    pub fn direction(&self, fru: &PsuFru) -> FanDirection {
        if !fru.is_available() {
            return FanDirection::NotApplicable;
        }
        self.lookup(fru)
            .map(|m| m.direction)
            .unwrap_or(FanDirection::NotApplicable)
    }

    pub fn default_max_speed(&self) -> u32 {
        self.default_max_speed
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
