//! Chassis and PSU fans
//!
//! Chassis fans have no presence pin: a fan is present when its tachometer
//! reports a non-zero RPM. Fan speed cannot be set from the platform layer.

use dbmvtx_core::board::fan_rpm_register;
use dbmvtx_core::FanDirection;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::HardwareContext;
use crate::inventory::psu_fan_rpm_attr;

/// Where a fan sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanKind {
    /// Chassis fan with its 1-based index across all drawers
    Chassis { index: usize },
    /// Fan `index` (1-based) of power supply `psu` (1-based)
    Psu { psu: usize, index: usize },
}

/// A single fan
#[derive(Debug, Clone)]
pub struct Fan {
    kind: FanKind,
    name: String,
    ctx: Arc<HardwareContext>,
}

impl Fan {
    pub fn chassis(ctx: Arc<HardwareContext>, drawer: usize, fan: usize) -> Self {
        let index = drawer * ctx.config.fan.fans_per_drawer + fan + 1;
        Self {
            kind: FanKind::Chassis { index },
            name: format!("Fantray{}_Fan{}", drawer + 1, fan + 1),
            ctx,
        }
    }

    pub fn psu(ctx: Arc<HardwareContext>, psu: usize, index: usize) -> Self {
        Self {
            kind: FanKind::Psu { psu, index },
            name: format!("PSU{}_Fan{}", psu, index),
            ctx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FanKind {
        self.kind
    }

    pub fn is_psu_fan(&self) -> bool {
        matches!(self.kind, FanKind::Psu { .. })
    }

    /// Current speed in RPM, 0 when it cannot be read
    pub fn speed_rpm(&self) -> u32 {
        match self.kind {
            FanKind::Chassis { index } => {
                let Some(offset) = fan_rpm_register(index) else {
                    debug!("No tachometer register for fan{}", index);
                    return 0;
                };
                self.ctx
                    .registers
                    .read_u16(offset)
                    .map(u32::from)
                    .unwrap_or(0)
            }
            FanKind::Psu { psu, index } => self
                .ctx
                .inventory
                .psu_attribute(psu, &psu_fan_rpm_attr(index))
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|rpm| rpm as u32)
                .unwrap_or(0),
        }
    }

    /// Speed reported as 100%, in RPM
    pub fn max_speed(&self) -> u32 {
        match self.kind {
            FanKind::Chassis { index } => {
                let fan = &self.ctx.config.fan;
                let base = if index % 2 == 0 {
                    fan.inlet_max_speed
                } else {
                    fan.exhaust_max_speed
                };
                let with_tolerance =
                    u64::from(base) + u64::from(base) * u64::from(fan.max_speed_tolerance) / 100;
                u32::try_from(with_tolerance).unwrap_or(u32::MAX)
            }
            FanKind::Psu { psu, .. } => {
                let fru = self.ctx.inventory.psu_fru(psu);
                self.ctx.psu_catalog.max_speed(&fru)
            }
        }
    }

    /// Speed as a percentage of the max speed, capped at 100
    pub fn speed_percent(&self) -> u32 {
        speed_percent(self.speed_rpm(), self.max_speed())
    }

    /// Expected speed; the hardware runs its own fan curve so this is the
    /// current speed
    pub fn target_speed(&self) -> u32 {
        self.speed_percent()
    }

    pub fn presence(&self) -> bool {
        match self.kind {
            FanKind::Psu { .. } => true,
            FanKind::Chassis { index } => {
                if fan_rpm_register(index).is_none() {
                    return false;
                }
                let value = if self.speed_rpm() != 0 { "1" } else { "0" };
                self.ctx
                    .config
                    .fan
                    .present_valmap
                    .get(value)
                    .copied()
                    .unwrap_or(false)
            }
        }
    }

    pub fn direction(&self) -> FanDirection {
        match self.kind {
            FanKind::Psu { psu, .. } => {
                let fru = self.ctx.inventory.psu_fru(psu);
                self.ctx.psu_catalog.direction(&fru)
            }
            FanKind::Chassis { index } => {
                let value = if index % 2 == 0 { "0" } else { "1" };
                self.ctx
                    .config
                    .fan
                    .direction_valmap
                    .get(value)
                    .copied()
                    .unwrap_or(FanDirection::NotApplicable)
            }
        }
    }

    /// Fan speed is controlled by the FPGA; requests are always refused
    pub fn set_speed(&self, percent: u32) -> bool {
        warn!(
            "Setting fan speed is not allowed ({} requested {}%)",
            self.name, percent
        );
        false
    }
}

/// `round(rpm * 100 / max_speed)` capped at 100; 0 when `max_speed` is 0
pub fn speed_percent(rpm: u32, max_speed: u32) -> u32 {
    if max_speed == 0 {
        return 0;
    }
    // Halves round to even
    let percent = (rpm as f64 * 100.0 / max_speed as f64).round_ties_even() as u32;
    percent.min(100)
}

/// A fan tray holding one or more chassis fans
#[derive(Debug, Clone)]
pub struct FanDrawer {
    index: usize,
    fans: Vec<Fan>,
}

impl FanDrawer {
    /// Drawer with 0-based `index`
    pub fn new(ctx: Arc<HardwareContext>, index: usize) -> Self {
        let fans = (0..ctx.config.fan.fans_per_drawer)
            .map(|fan| Fan::chassis(ctx.clone(), index, fan))
            .collect();
        Self { index, fans }
    }

    pub fn name(&self) -> String {
        format!("Fantray{}", self.index + 1)
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }

    pub fn model(&self) -> &'static str {
        "NA"
    }

    pub fn serial(&self) -> &'static str {
        "NA"
    }

    /// A drawer is present when any of its fans is
    pub fn presence(&self) -> bool {
        self.fans.iter().any(Fan::presence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{PSU_MFR_ID_ATTR, PSU_MODEL_NAME_ATTR};
    use crate::mock::{MemoryBus, MemoryInventory};
    use dbmvtx_core::{PlatformConfig, PsuModelEntry};

    struct Rig {
        ctx: Arc<HardwareContext>,
        bus: Arc<MemoryBus>,
        inventory: Arc<MemoryInventory>,
    }

    fn rig() -> Rig {
        let mut config = PlatformConfig::default();
        config.psu.models.push(PsuModelEntry {
            manufacturer: "DELTA".to_string(),
            model: "DPS-550AB".to_string(),
            max_speed: 21000,
            direction: FanDirection::Exhaust,
        });
        let bus = Arc::new(MemoryBus::new());
        let inventory = Arc::new(MemoryInventory::new());
        let ctx = Arc::new(HardwareContext::new(
            config,
            bus.clone(),
            inventory.clone(),
        ));
        Rig {
            ctx,
            bus,
            inventory,
        }
    }

    fn set_rpm(bus: &MemoryBus, offset: u8, rpm: u16) {
        bus.set(offset, (rpm >> 8) as u8);
        bus.set(offset + 1, (rpm & 0xff) as u8);
    }

    #[test]
    fn test_chassis_fan_indexing() {
        let rig = rig();
        let fan = Fan::chassis(rig.ctx.clone(), 1, 0);
        assert_eq!(fan.name(), "Fantray2_Fan1");
        assert_eq!(fan.kind(), FanKind::Chassis { index: 3 });
        assert!(!fan.is_psu_fan());
    }

    #[test]
    fn test_chassis_fan_rpm() {
        let rig = rig();
        set_rpm(&rig.bus, 0x20, 12000);
        let fan = Fan::chassis(rig.ctx.clone(), 0, 0);
        assert_eq!(fan.speed_rpm(), 12000);

        rig.bus.fail(0x21);
        assert_eq!(fan.speed_rpm(), 0);
    }

    #[test]
    fn test_chassis_fan_without_register() {
        let mut config = PlatformConfig::default();
        config.fan.drawer_count = 5;
        let ctx = Arc::new(HardwareContext::new(
            config,
            Arc::new(MemoryBus::new()),
            Arc::new(MemoryInventory::new()),
        ));
        // fan9 has no tachometer register
        let fan = Fan::chassis(ctx, 4, 0);
        assert_eq!(fan.speed_rpm(), 0);
        assert!(!fan.presence());
    }

    #[test]
    fn test_chassis_max_speed_by_parity() {
        let rig = rig();
        // index 1 is odd: exhaust
        let fan1 = Fan::chassis(rig.ctx.clone(), 0, 0);
        assert_eq!(fan1.max_speed(), 20500 + 2050);
        // index 2 is even: inlet
        let fan2 = Fan::chassis(rig.ctx.clone(), 0, 1);
        assert_eq!(fan2.max_speed(), 23000 + 2300);
    }

    #[test]
    fn test_speed_percent() {
        assert_eq!(speed_percent(0, 22550), 0);
        assert_eq!(speed_percent(22550, 22550), 100);
        assert_eq!(speed_percent(30000, 22550), 100);
        assert_eq!(speed_percent(11275, 22550), 50);
        assert_eq!(speed_percent(1000, 0), 0);
    }

    #[test]
    fn test_speed_percent_rounds_half_to_even() {
        // 0.5% and 2.5% of the default PSU max speed
        assert_eq!(speed_percent(90, 18000), 0);
        assert_eq!(speed_percent(450, 18000), 2);
        assert_eq!(speed_percent(270, 18000), 2);
    }

    #[test]
    fn test_chassis_max_speed_saturates() {
        let mut config = PlatformConfig::default();
        config.fan.exhaust_max_speed = 100_000;
        config.fan.max_speed_tolerance = 50_000;
        let ctx = Arc::new(HardwareContext::new(
            config,
            Arc::new(MemoryBus::new()),
            Arc::new(MemoryInventory::new()),
        ));

        let fan = Fan::chassis(ctx, 0, 0);
        assert_eq!(fan.max_speed(), u32::MAX);
        assert_eq!(fan.speed_percent(), 0);
    }

    #[test]
    fn test_chassis_fan_percent_and_target() {
        let rig = rig();
        set_rpm(&rig.bus, 0x20, 11275);
        let fan = Fan::chassis(rig.ctx.clone(), 0, 0);
        assert_eq!(fan.speed_percent(), 50);
        assert_eq!(fan.target_speed(), 50);
    }

    #[test]
    fn test_chassis_presence_follows_rpm() {
        let rig = rig();
        let fan = Fan::chassis(rig.ctx.clone(), 0, 0);
        set_rpm(&rig.bus, 0x20, 9000);
        assert!(fan.presence());

        set_rpm(&rig.bus, 0x20, 0);
        assert!(!fan.presence());
    }

    #[test]
    fn test_chassis_presence_unmapped_value_is_absent() {
        let mut config = PlatformConfig::default();
        config.fan.present_valmap.clear();
        let bus = Arc::new(MemoryBus::new());
        set_rpm(&bus, 0x20, 9000);
        let ctx = Arc::new(HardwareContext::new(
            config,
            bus,
            Arc::new(MemoryInventory::new()),
        ));

        assert!(!Fan::chassis(ctx, 0, 0).presence());
    }

    #[test]
    fn test_chassis_direction() {
        let rig = rig();
        assert_eq!(
            Fan::chassis(rig.ctx.clone(), 0, 0).direction(),
            FanDirection::Exhaust
        );
        assert_eq!(
            Fan::chassis(rig.ctx.clone(), 0, 1).direction(),
            FanDirection::Intake
        );

        let mut config = PlatformConfig::default();
        config.fan.direction_valmap.remove("1");
        let ctx = Arc::new(HardwareContext::new(
            config,
            Arc::new(MemoryBus::new()),
            Arc::new(MemoryInventory::new()),
        ));
        assert_eq!(
            Fan::chassis(ctx, 0, 0).direction(),
            FanDirection::NotApplicable
        );
    }

    #[test]
    fn test_psu_fan_rpm() {
        let rig = rig();
        let fan = Fan::psu(rig.ctx.clone(), 1, 1);
        assert_eq!(fan.name(), "PSU1_Fan1");
        assert_eq!(fan.speed_rpm(), 0);

        rig.inventory
            .set_psu_attr(1, "psu_fan1_speed_rpm", "8123.0\n");
        assert_eq!(fan.speed_rpm(), 8123);

        rig.inventory.set_psu_attr(1, "psu_fan1_speed_rpm", "NA");
        assert_eq!(fan.speed_rpm(), 0);
    }

    #[test]
    fn test_psu_fan_catalog_lookup() {
        let rig = rig();
        let fan = Fan::psu(rig.ctx.clone(), 1, 1);
        assert!(fan.presence());

        // FRU unreadable
        assert_eq!(fan.max_speed(), 18000);
        assert_eq!(fan.direction(), FanDirection::NotApplicable);

        rig.inventory.set_psu_attr(1, PSU_MFR_ID_ATTR, "DELTA");
        rig.inventory.set_psu_attr(1, PSU_MODEL_NAME_ATTR, "DPS-550AB");
        assert_eq!(fan.max_speed(), 21000);
        assert_eq!(fan.direction(), FanDirection::Exhaust);

        rig.inventory.set_psu_attr(1, PSU_MODEL_NAME_ATTR, "DPS-1100");
        assert_eq!(fan.max_speed(), 18000);
        assert_eq!(fan.direction(), FanDirection::NotApplicable);
    }

    #[test]
    fn test_set_speed_refused() {
        let rig = rig();
        assert!(!Fan::chassis(rig.ctx.clone(), 0, 0).set_speed(50));
        assert!(!Fan::psu(rig.ctx.clone(), 1, 1).set_speed(50));
    }

    #[test]
    fn test_fan_drawer() {
        let rig = rig();
        let drawer = FanDrawer::new(rig.ctx.clone(), 2);
        assert_eq!(drawer.name(), "Fantray3");
        assert_eq!(drawer.model(), "NA");
        assert_eq!(drawer.serial(), "NA");
        assert_eq!(drawer.fans().len(), 2);
        assert_eq!(drawer.fans()[1].name(), "Fantray3_Fan2");
        assert!(!drawer.presence());

        set_rpm(&rig.bus, 0x2a, 5000);
        assert!(drawer.presence());
    }
}
