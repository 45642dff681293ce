//! Temperature sensors
//!
//! Chassis sensors are single FPGA registers scaled with the configured
//! gain/offset. PSU sensors come from the inventory framework in
//! milli-Celsius and have no thresholds.

use dbmvtx_core::board::{temp_label, temp_register, TEMP_THRESHOLD_REG};
use dbmvtx_core::{PlatformError, Result};
use std::sync::Arc;
use tracing::debug;

use crate::context::HardwareContext;
use crate::inventory::PSU_TEMP1_ATTR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalKind {
    /// Chassis sensor with its 1-based index
    Chassis { index: usize },
    /// First sensor of the 1-based power supply `psu`
    Psu { psu: usize },
}

/// A temperature sensor with recorded extrema
#[derive(Debug, Clone)]
pub struct Thermal {
    kind: ThermalKind,
    name: String,
    ctx: Arc<HardwareContext>,
    min_recorded: Option<f64>,
    max_recorded: Option<f64>,
}

impl Thermal {
    pub fn chassis(ctx: Arc<HardwareContext>, index: usize) -> Self {
        Self::new(ctx, ThermalKind::Chassis { index }, format!("Temp{}", index))
    }

    pub fn psu(ctx: Arc<HardwareContext>, psu: usize) -> Self {
        Self::new(ctx, ThermalKind::Psu { psu }, format!("PSU{}_Temp1", psu))
    }

    fn new(ctx: Arc<HardwareContext>, kind: ThermalKind, name: String) -> Self {
        let mut thermal = Self {
            kind,
            name,
            ctx,
            min_recorded: None,
            max_recorded: None,
        };
        let reading = thermal.temperature();
        thermal.min_recorded = reading;
        thermal.max_recorded = reading;
        thermal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ThermalKind {
        self.kind
    }

    pub fn is_psu_thermal(&self) -> bool {
        matches!(self.kind, ThermalKind::Psu { .. })
    }

    /// Current temperature in Celsius, `None` without a valid reading
    pub fn temperature(&self) -> Option<f64> {
        match self.kind {
            ThermalKind::Psu { psu } => self
                .ctx
                .inventory
                .psu_attribute(psu, PSU_TEMP1_ATTR)
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|milli| milli / 1000.0),
            ThermalKind::Chassis { index } => {
                let Some(offset) = temp_register(index) else {
                    debug!("No temperature register for temp{}", index);
                    return None;
                };
                let raw = self.ctx.registers.read_u8(offset).ok()?;
                // A zero byte means the sensor has no reading
                if raw == 0 {
                    return None;
                }
                let thermal = &self.ctx.config.thermal;
                Some((raw as f64 * thermal.gain + thermal.offset) / 1000.0)
            }
        }
    }

    /// Lowest temperature seen so far, sampling a new reading first
    pub fn min_recorded(&mut self) -> Option<f64> {
        if let Some(reading) = self.temperature() {
            self.min_recorded = Some(match self.min_recorded {
                Some(min) => min.min(reading),
                None => reading,
            });
        }
        self.min_recorded
    }

    /// Highest temperature seen so far, sampling a new reading first
    pub fn max_recorded(&mut self) -> Option<f64> {
        if let Some(reading) = self.temperature() {
            self.max_recorded = Some(match self.max_recorded {
                Some(max) => max.max(reading),
                None => reading,
            });
        }
        self.max_recorded
    }

    pub fn high_threshold(&self) -> Result<f64> {
        self.shared_threshold("high threshold")
    }

    /// Shares register 0x50 with the high threshold
    pub fn high_critical_threshold(&self) -> Result<f64> {
        self.shared_threshold("high critical threshold")
    }

    pub fn low_threshold(&self) -> Result<f64> {
        self.fixed_threshold("low threshold")
    }

    pub fn low_critical_threshold(&self) -> Result<f64> {
        self.fixed_threshold("low critical threshold")
    }

    pub fn label(&self) -> String {
        match self.kind {
            ThermalKind::Chassis { index } => temp_label(index).unwrap_or_default().to_string(),
            ThermalKind::Psu { psu } => format!("PSU{} Temp", psu),
        }
    }

    fn shared_threshold(&self, what: &str) -> Result<f64> {
        match self.kind {
            ThermalKind::Psu { .. } => Err(self.not_supported(what)),
            ThermalKind::Chassis { .. } => Ok(self
                .ctx
                .registers
                .read_u8(TEMP_THRESHOLD_REG)
                .map(f64::from)
                .unwrap_or(0.0)),
        }
    }

    fn fixed_threshold(&self, what: &str) -> Result<f64> {
        match self.kind {
            ThermalKind::Psu { .. } => Err(self.not_supported(what)),
            ThermalKind::Chassis { .. } => Ok(0.0),
        }
    }

    fn not_supported(&self, what: &str) -> PlatformError {
        PlatformError::NotSupported(format!("{} {}", self.name, what))
    }
}
