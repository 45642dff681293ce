//! Firmware components

use dbmvtx_core::board::{COMPONENTS, FPGA_FW_VERSION_REG};
use dbmvtx_core::{PlatformError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::context::HardwareContext;
use crate::sysfs;

/// A firmware component of the board, identified by its table index
#[derive(Debug, Clone)]
pub struct Component {
    index: usize,
    ctx: Arc<HardwareContext>,
}

impl Component {
    pub fn new(ctx: Arc<HardwareContext>, index: usize) -> Result<Self> {
        if index >= COMPONENTS.len() {
            return Err(PlatformError::OutOfRange {
                kind: "Component",
                index,
                count: COMPONENTS.len(),
            });
        }
        Ok(Self { index, ctx })
    }

    /// Every component of the board, in table order
    pub fn all(ctx: &Arc<HardwareContext>) -> Vec<Self> {
        (0..COMPONENTS.len())
            .map(|index| Self {
                index,
                ctx: ctx.clone(),
            })
            .collect()
    }

    pub fn name(&self) -> &'static str {
        COMPONENTS[self.index].0
    }

    pub fn description(&self) -> &'static str {
        COMPONENTS[self.index].1
    }

    /// Version read from the hardware on every call
    pub fn firmware_version(&self) -> Option<String> {
        match self.name() {
            "BIOS" => {
                let path = &self.ctx.config.paths.bios_version;
                match sysfs::read_trimmed(path) {
                    Ok(version) => Some(version),
                    Err(e) => {
                        debug!("BIOS version unavailable from {}: {}", path.display(), e);
                        None
                    }
                }
            }
            "SysFPGA" => Some(
                self.ctx
                    .registers
                    .read_u8(FPGA_FW_VERSION_REG)
                    .map(|v| format!("{:#04x}", v))
                    .unwrap_or_else(|_| "N/A".to_string()),
            ),
            _ => None,
        }
    }

    pub fn install_firmware(&self, image_path: &Path) -> Result<bool> {
        Err(PlatformError::NotSupported(format!(
            "installing {} firmware from {}",
            self.name(),
            image_path.display()
        )))
    }
}
