//! Shared hardware handles

use dbmvtx_core::{PlatformConfig, PsuCatalog};
use std::sync::Arc;

use crate::inventory::{Inventory, SysfsInventory};
use crate::register::{I2cGetBus, RegisterBus, RegisterReader};

/// Everything a device accessor needs to reach the hardware.
///
/// Built once from the configuration and shared by every fan, thermal,
/// component and transceiver of the chassis.
pub struct HardwareContext {
    pub config: PlatformConfig,
    /// Registers of the system FPGA
    pub registers: RegisterReader,
    pub inventory: Arc<dyn Inventory>,
    pub psu_catalog: PsuCatalog,
}

impl HardwareContext {
    pub fn new(
        config: PlatformConfig,
        bus: Arc<dyn RegisterBus>,
        inventory: Arc<dyn Inventory>,
    ) -> Self {
        let registers = RegisterReader::new(bus, config.fpga.i2c_bus, config.fpga.address);
        let psu_catalog = config.psu.catalog();
        Self {
            config,
            registers,
            inventory,
            psu_catalog,
        }
    }

    /// Context for the real board: `i2cget` for registers, sysfs for inventory
    pub fn from_config(config: PlatformConfig) -> Self {
        let inventory = Arc::new(SysfsInventory::new(&config.inventory));
        Self::new(config, Arc::new(I2cGetBus::new()), inventory)
    }
}

impl std::fmt::Debug for HardwareContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareContext")
            .field("platform", &self.config.platform.name)
            .field("registers", &self.registers)
            .field("psu_models", &self.psu_catalog.len())
            .finish()
    }
}
