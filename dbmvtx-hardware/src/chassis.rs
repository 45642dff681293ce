//! Chassis: every device on the board behind one handle
//!
//! The chassis owns the fan drawers, PSU fans, temperature sensors, firmware
//! components, transceiver ports and the transceiver monitor. The watchdog is
//! loaded on first use.

use dbmvtx_core::{
    ChangeEvents, PlatformConfig, PlatformError, RebootCause, RebootCauseKind, Result,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::component::Component;
use crate::context::HardwareContext;
use crate::fan::{Fan, FanDrawer};
use crate::sysfs;
use crate::thermal::Thermal;
use crate::watchdog::Watchdog;
use crate::xcvr::{Sfp, TransceiverMonitor};

/// Reboot cause reported when the cause file cannot be read
pub const UNKNOWN_REBOOT_CAUSE: &str = "Unknown";

pub struct Chassis {
    ctx: Arc<HardwareContext>,
    fan_drawers: Vec<FanDrawer>,
    psu_fans: Vec<Fan>,
    thermals: Vec<Thermal>,
    psu_thermals: Vec<Thermal>,
    components: Vec<Component>,
    sfps: Vec<Sfp>,
    monitor: TransceiverMonitor,
    watchdog: Option<Watchdog>,
}

impl Chassis {
    pub fn new(ctx: HardwareContext) -> Self {
        Self::with_clock(ctx, Arc::new(SystemClock))
    }

    /// Chassis whose transceiver monitor sleeps on `clock`
    pub fn with_clock(ctx: HardwareContext, clock: Arc<dyn Clock>) -> Self {
        let ctx = Arc::new(ctx);
        let config = &ctx.config;

        let fan_drawers = (0..config.fan.drawer_count)
            .map(|drawer| FanDrawer::new(ctx.clone(), drawer))
            .collect();

        let psu_fans = (1..=config.psu.count)
            .flat_map(|psu| (1..=config.psu.fans_per_psu).map(move |fan| (psu, fan)))
            .map(|(psu, fan)| Fan::psu(ctx.clone(), psu, fan))
            .collect();

        let thermals = (1..=config.thermal.sensor_count)
            .map(|index| Thermal::chassis(ctx.clone(), index))
            .collect();

        let psu_thermals = (1..=config.psu.count)
            .map(|psu| Thermal::psu(ctx.clone(), psu))
            .collect();

        let sfps: Vec<Sfp> = (0..config.xcvr.num_ports)
            .map(|port| Sfp::new(ctx.inventory.clone(), port))
            .collect();

        let monitor = TransceiverMonitor::new(sfps.clone(), clock);
        let components = Component::all(&ctx);

        debug!(
            "Chassis {} built: {} fan drawers, {} PSU fans, {} thermals, {} ports",
            config.platform.name,
            config.fan.drawer_count,
            config.psu.count * config.psu.fans_per_psu,
            config.thermal.sensor_count,
            sfps.len()
        );

        Self {
            ctx,
            fan_drawers,
            psu_fans,
            thermals,
            psu_thermals,
            components,
            sfps,
            monitor,
            watchdog: None,
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &Arc<HardwareContext> {
        &self.ctx
    }

    pub fn name(&self) -> &str {
        &self.ctx.config.platform.name
    }

    /// The chassis is the top-level device
    pub fn position_in_parent(&self) -> i32 {
        -1
    }

    pub fn is_replaceable(&self) -> bool {
        false
    }

    /// Software-recorded cause of the previous reboot
    pub fn reboot_cause(&self) -> RebootCause {
        let path = &self.ctx.config.paths.reboot_cause;
        let description = sysfs::read_trimmed(path).unwrap_or_else(|e| {
            debug!("Reboot cause unavailable from {}: {}", path.display(), e);
            UNKNOWN_REBOOT_CAUSE.to_string()
        });
        RebootCause {
            kind: RebootCauseKind::NonHardware,
            description,
        }
    }

    pub fn fan_drawers(&self) -> &[FanDrawer] {
        &self.fan_drawers
    }

    pub fn psu_fans(&self) -> &[Fan] {
        &self.psu_fans
    }

    /// Chassis fans followed by PSU fans
    pub fn all_fans(&self) -> impl Iterator<Item = &Fan> {
        self.fan_drawers
            .iter()
            .flat_map(|drawer| drawer.fans())
            .chain(self.psu_fans.iter())
    }

    pub fn thermals(&self) -> &[Thermal] {
        &self.thermals
    }

    pub fn psu_thermals(&self) -> &[Thermal] {
        &self.psu_thermals
    }

    /// Chassis sensors followed by PSU sensors
    pub fn all_thermals_mut(&mut self) -> impl Iterator<Item = &mut Thermal> {
        self.thermals.iter_mut().chain(self.psu_thermals.iter_mut())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn num_sfps(&self) -> usize {
        self.sfps.len()
    }

    /// Transceiver on the 0-based `index`; out-of-range indexes are logged
    pub fn sfp(&self, index: usize) -> Option<&Sfp> {
        let sfp = self.sfps.get(index);
        if sfp.is_none() {
            warn!(
                "{}",
                PlatformError::OutOfRange {
                    kind: "SFP",
                    index,
                    count: self.sfps.len(),
                }
            );
        }
        sfp
    }

    /// Hardware watchdog, loaded on first use.
    ///
    /// Returns `None` (and logs why) when the watchdog cannot be loaded; the
    /// next call tries again.
    pub fn watchdog(&mut self) -> Option<&mut Watchdog> {
        if self.watchdog.is_none() {
            let config = &self.ctx.config.watchdog;
            match Watchdog::open(&config.device, &config.sysfs_dir) {
                Ok(watchdog) => self.watchdog = Some(watchdog),
                Err(e) => warn!("Fail to load watchdog: {}", e),
            }
        }
        self.watchdog.as_mut()
    }

    /// Wait for transceiver insertions or removals, see
    /// [`TransceiverMonitor::wait_for_change`]
    pub fn change_event(&mut self, timeout_ms: i64) -> (bool, ChangeEvents) {
        let (ok, sfp) = self.monitor.wait_for_change(timeout_ms);
        (ok, ChangeEvents { sfp })
    }

    pub fn thermal_manager(&self) -> Result<()> {
        Err(PlatformError::NotSupported("thermal manager".to_string()))
    }
}

impl std::fmt::Debug for Chassis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chassis")
            .field("name", &self.name())
            .field("fan_drawers", &self.fan_drawers.len())
            .field("psu_fans", &self.psu_fans.len())
            .field("thermals", &self.thermals.len())
            .field("sfps", &self.sfps.len())
            .field("watchdog_loaded", &self.watchdog.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{simulated_platform, ManualClock, MemoryBus, MemoryInventory};
    use dbmvtx_core::PresenceCode;
    use std::fs;
    use tempfile::TempDir;

    fn chassis(config: PlatformConfig) -> (Chassis, Arc<MemoryInventory>) {
        let inventory = Arc::new(MemoryInventory::new());
        let ctx = HardwareContext::new(config, Arc::new(MemoryBus::new()), inventory.clone());
        (
            Chassis::with_clock(ctx, Arc::new(ManualClock::new())),
            inventory,
        )
    }

    #[test]
    fn test_inventory_layout() {
        let (chassis, _) = chassis(PlatformConfig::default());
        assert_eq!(chassis.name(), "DB-MVTX9180");
        assert_eq!(chassis.position_in_parent(), -1);
        assert!(!chassis.is_replaceable());

        assert_eq!(chassis.fan_drawers().len(), 4);
        assert_eq!(chassis.psu_fans().len(), 2);
        assert_eq!(chassis.all_fans().count(), 10);
        assert_eq!(chassis.thermals().len(), 3);
        assert_eq!(chassis.psu_thermals().len(), 2);
        assert_eq!(chassis.components().len(), 2);
        assert_eq!(chassis.num_sfps(), 32);

        let names: Vec<&str> = chassis.all_fans().map(Fan::name).collect();
        assert_eq!(names[0], "Fantray1_Fan1");
        assert_eq!(names[7], "Fantray4_Fan2");
        assert_eq!(names[9], "PSU2_Fan1");
    }

    #[test]
    fn test_reboot_cause() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reboot-cause.txt");
        let mut config = PlatformConfig::default();
        config.paths.reboot_cause = path.clone();
        let (chassis, _) = chassis(config);

        let cause = chassis.reboot_cause();
        assert_eq!(cause.kind, RebootCauseKind::NonHardware);
        assert_eq!(cause.description, "Unknown");

        fs::write(&path, "User issued 'reboot' command\n").unwrap();
        assert_eq!(
            chassis.reboot_cause().description,
            "User issued 'reboot' command"
        );
    }

    #[test]
    fn test_sfp_lookup() {
        let (chassis, _) = chassis(PlatformConfig::default());
        assert_eq!(chassis.sfp(0).map(Sfp::port), Some(0));
        assert_eq!(chassis.sfp(31).map(Sfp::port), Some(31));
        assert!(chassis.sfp(32).is_none());
    }

    #[test]
    fn test_watchdog_load_failure() {
        let mut config = PlatformConfig::default();
        config.watchdog.sysfs_dir = "/nonexistent/watchdog1".into();
        let (mut chassis, _) = chassis(config);
        assert!(chassis.watchdog().is_none());
    }

    #[test]
    fn test_watchdog_loaded_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("timeout"), "90\n").unwrap();
        let mut config = PlatformConfig::default();
        config.watchdog.sysfs_dir = dir.path().to_path_buf();
        config.watchdog.device = dir.path().join("watchdog1");
        let (mut chassis, _) = chassis(config);

        assert_eq!(chassis.watchdog().map(|wd| wd.timeout()), Some(90));
        fs::write(dir.path().join("timeout"), "30\n").unwrap();
        // Same controller, timeout not re-read
        assert_eq!(chassis.watchdog().map(|wd| wd.timeout()), Some(90));
    }

    #[test]
    fn test_change_event_envelope() {
        let mut config = PlatformConfig::default();
        config.xcvr.num_ports = 16;
        let (mut chassis, inventory) = chassis(config);
        assert_eq!(chassis.change_event(500), (true, ChangeEvents::default()));

        inventory.set_sfp(11, true);
        let (ok, events) = chassis.change_event(500);
        assert!(ok);
        assert_eq!(events.sfp.get(&11), Some(&PresenceCode::Inserted));
        assert_eq!(events.sfp.len(), 1);

        assert_eq!(chassis.change_event(-5), (false, ChangeEvents::default()));
    }

    #[test]
    fn test_thermal_manager_not_supported() {
        let (chassis, _) = chassis(PlatformConfig::default());
        assert!(matches!(
            chassis.thermal_manager(),
            Err(PlatformError::NotSupported(_))
        ));
    }

    #[test]
    fn test_simulated_platform_readings() {
        let mut config = PlatformConfig::default();
        config.psu.models.push(dbmvtx_core::PsuModelEntry {
            manufacturer: "DELTA".to_string(),
            model: "DPS-550AB".to_string(),
            max_speed: 21000,
            direction: dbmvtx_core::FanDirection::Exhaust,
        });
        let (ctx, _, _) = simulated_platform(config);
        let mut chassis = Chassis::with_clock(ctx, Arc::new(ManualClock::new()));

        assert!(chassis.fan_drawers().iter().all(FanDrawer::presence));
        assert_eq!(chassis.psu_fans()[0].speed_rpm(), 8123);
        assert_eq!(
            chassis.psu_fans()[0].direction(),
            dbmvtx_core::FanDirection::Exhaust
        );
        assert_eq!(chassis.thermals()[0].temperature(), Some(28.0));
        assert_eq!(chassis.psu_thermals()[0].temperature(), Some(31.5));
        assert_eq!(
            chassis.component(1).and_then(Component::firmware_version),
            Some("0x13".to_string())
        );
        assert!(chassis.all_thermals_mut().count() == 5);
    }
}
