//! Inventory framework collaborator
//!
//! The base inventory framework owns the per-device sysfs nodes created by its
//! kernel drivers. The platform only needs a narrow slice of it: transceiver
//! presence and a handful of PSU attributes.

use dbmvtx_core::config::InventoryConfig;
use dbmvtx_core::{PlatformError, PsuFru, Result, FRU_NOT_AVAILABLE};
use std::path::PathBuf;
use tracing::debug;

use crate::sysfs;

/// PSU attribute holding the manufacturer ID
pub const PSU_MFR_ID_ATTR: &str = "psu_mfr_id";
/// PSU attribute holding the model name
pub const PSU_MODEL_NAME_ATTR: &str = "psu_model_name";
/// PSU attribute holding the first temperature sensor, in milli-Celsius
pub const PSU_TEMP1_ATTR: &str = "psu_temp1_input";

/// PSU attribute holding the RPM of a 1-based PSU fan
pub fn psu_fan_rpm_attr(fan_index: usize) -> String {
    format!("psu_fan{}_speed_rpm", fan_index)
}

/// Device lookups provided by the inventory framework
pub trait Inventory: Send + Sync {
    /// Whether a module is plugged into the 0-based transceiver `port`
    fn sfp_presence(&self, port: usize) -> Result<bool>;

    /// Raw value of `attr` for the 1-based `psu`, `None` when unavailable
    fn psu_attribute(&self, psu: usize, attr: &str) -> Option<String>;

    /// FRU identity of the 1-based `psu`
    fn psu_fru(&self, psu: usize) -> PsuFru {
        match self.psu_attribute(psu, PSU_MFR_ID_ATTR) {
            Some(mfr_id) => PsuFru {
                mfr_id,
                model: self
                    .psu_attribute(psu, PSU_MODEL_NAME_ATTR)
                    .unwrap_or_else(|| FRU_NOT_AVAILABLE.to_string()),
            },
            None => PsuFru::not_available(),
        }
    }
}

/// Inventory backed by the framework's sysfs nodes
#[derive(Debug, Clone)]
pub struct SysfsInventory {
    sfp_presence: String,
    psu_attr: String,
}

impl SysfsInventory {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            sfp_presence: config.sfp_presence.clone(),
            psu_attr: config.psu_attr.clone(),
        }
    }

    fn sfp_presence_path(&self, port: usize) -> PathBuf {
        PathBuf::from(self.sfp_presence.replace("{port}", &(port + 1).to_string()))
    }

    fn psu_attr_path(&self, psu: usize, attr: &str) -> PathBuf {
        PathBuf::from(
            self.psu_attr
                .replace("{psu}", &psu.to_string())
                .replace("{attr}", attr),
        )
    }
}

impl Inventory for SysfsInventory {
    fn sfp_presence(&self, port: usize) -> Result<bool> {
        let path = self.sfp_presence_path(port);
        match sysfs::read_trimmed(&path)?.as_str() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(PlatformError::Parse(format!(
                "{}: unexpected presence value '{}'",
                path.display(),
                other
            ))),
        }
    }

    fn psu_attribute(&self, psu: usize, attr: &str) -> Option<String> {
        let path = self.psu_attr_path(psu, attr);
        match sysfs::read_trimmed(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("PSU{} attribute {} unavailable: {}", psu, attr, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inventory(dir: &TempDir) -> SysfsInventory {
        let root = dir.path().display();
        SysfsInventory::new(&InventoryConfig {
            sfp_presence: format!("{}/PORT{{port}}/xcvr_present", root),
            psu_attr: format!("{}/PSU{{psu}}/{{attr}}", root),
        })
    }

    #[test]
    fn test_sfp_presence_uses_one_based_port() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("PORT1")).unwrap();
        fs::write(dir.path().join("PORT1/xcvr_present"), "1\n").unwrap();
        fs::create_dir(dir.path().join("PORT2")).unwrap();
        fs::write(dir.path().join("PORT2/xcvr_present"), "0\n").unwrap();

        let inv = inventory(&dir);
        assert!(inv.sfp_presence(0).unwrap());
        assert!(!inv.sfp_presence(1).unwrap());
        assert!(inv.sfp_presence(2).is_err());
    }

    #[test]
    fn test_sfp_presence_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("PORT1")).unwrap();
        fs::write(dir.path().join("PORT1/xcvr_present"), "maybe").unwrap();

        let inv = inventory(&dir);
        assert!(matches!(inv.sfp_presence(0), Err(PlatformError::Parse(_))));
    }

    #[test]
    fn test_psu_fru() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("PSU1")).unwrap();
        fs::write(dir.path().join("PSU1/psu_mfr_id"), "DELTA\n").unwrap();
        fs::write(dir.path().join("PSU1/psu_model_name"), "DPS-550AB\n").unwrap();

        let inv = inventory(&dir);
        let fru = inv.psu_fru(1);
        assert_eq!(fru.mfr_id, "DELTA");
        assert_eq!(fru.model, "DPS-550AB");

        // No sysfs nodes for the second PSU
        assert!(!inv.psu_fru(2).is_available());
    }

    #[test]
    fn test_psu_fan_rpm_attr() {
        assert_eq!(psu_fan_rpm_attr(1), "psu_fan1_speed_rpm");
    }
}
