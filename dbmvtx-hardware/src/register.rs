//! Register access to the system FPGA
//!
//! Registers are read one byte at a time over I2C. The production bus shells
//! out to `i2cget`; tests and mock mode plug in an in-memory register file
//! through the [`RegisterBus`] trait.

use dbmvtx_core::{PlatformError, Result};
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-byte register reads on an I2C bus
pub trait RegisterBus: Send + Sync {
    /// Read the byte at `offset` of the device at `address` on `bus`
    fn read_byte(&self, bus: u8, address: u8, offset: u8) -> Result<u8>;
}

/// Register bus backed by the `i2cget` utility
#[derive(Debug, Clone)]
pub struct I2cGetBus {
    program: PathBuf,
}

impl I2cGetBus {
    pub fn new() -> Self {
        Self::with_program("i2cget")
    }

    /// Use a specific `i2cget` executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for I2cGetBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for I2cGetBus {
    fn read_byte(&self, bus: u8, address: u8, offset: u8) -> Result<u8> {
        let output = Command::new(&self.program)
            .arg("-f")
            .arg("-y")
            .arg(bus.to_string())
            .arg(format!("{:#04x}", address))
            .arg(format!("{:#04x}", offset))
            .output()
            .map_err(|e| PlatformError::Register {
                offset,
                reason: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(PlatformError::Register {
                offset,
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        parse_byte(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            PlatformError::Register {
                offset,
                reason: format!(
                    "unexpected reply '{}'",
                    String::from_utf8_lossy(&output.stdout).trim()
                ),
            }
        })
    }
}

/// Parse an `i2cget` reply such as `0x1f`
pub fn parse_byte(reply: &str) -> Option<u8> {
    let reply = reply.trim();
    let hex = reply
        .strip_prefix("0x")
        .or_else(|| reply.strip_prefix("0X"))?;
    u8::from_str_radix(hex, 16).ok()
}

/// Reads registers of one device, composing multi-byte values
#[derive(Clone)]
pub struct RegisterReader {
    bus: Arc<dyn RegisterBus>,
    bus_id: u8,
    address: u8,
}

impl RegisterReader {
    pub fn new(bus: Arc<dyn RegisterBus>, bus_id: u8, address: u8) -> Self {
        Self {
            bus,
            bus_id,
            address,
        }
    }

    /// Read one register; failures are logged with the offset
    pub fn read_u8(&self, offset: u8) -> Result<u8> {
        match self.bus.read_byte(self.bus_id, self.address, offset) {
            Ok(value) => {
                debug!("Register {:#04x} = {:#04x}", offset, value);
                Ok(value)
            }
            Err(e) => {
                warn!(
                    "Register read failed (bus {}, address {:#04x}, offset {:#04x}): {}",
                    self.bus_id, self.address, offset, e
                );
                Err(e)
            }
        }
    }

    /// Read a 16-bit value: high byte at `offset`, low byte at `offset + 1`
    pub fn read_u16(&self, offset: u8) -> Result<u16> {
        let high = self.read_u8(offset)?;
        let low = self.read_u8(offset.wrapping_add(1))?;
        Ok(((high as u16) << 8) | low as u16)
    }

    pub fn bus_id(&self) -> u8 {
        self.bus_id
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

impl std::fmt::Debug for RegisterReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterReader")
            .field("bus_id", &self.bus_id)
            .field("address", &format_args!("{:#04x}", self.address))
            .finish()
    }
}
