//! In-memory hardware for tests and the daemon's mock mode
//!
//! - [`MemoryBus`] - register file keyed by offset
//! - [`MemoryInventory`] - transceiver presence and PSU attributes
//! - [`ManualClock`] - clock that only advances when slept on

use dbmvtx_core::{PlatformConfig, PlatformError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::context::HardwareContext;
use crate::inventory::{
    psu_fan_rpm_attr, Inventory, PSU_MFR_ID_ATTR, PSU_MODEL_NAME_ATTR, PSU_TEMP1_ATTR,
};
use crate::register::RegisterBus;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register file of a single device.
///
/// Offsets that were never set read as failures, like a device that does not
/// answer.
#[derive(Debug, Default)]
pub struct MemoryBus {
    registers: Mutex<HashMap<u8, u8>>,
    failing: Mutex<HashSet<u8>>,
    reads: AtomicUsize,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, offset: u8, value: u8) {
        lock(&self.registers).insert(offset, value);
        lock(&self.failing).remove(&offset);
    }

    /// Make reads of `offset` fail
    pub fn fail(&self, offset: u8) {
        lock(&self.failing).insert(offset);
    }

    /// Number of read attempts so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RegisterBus for MemoryBus {
    fn read_byte(&self, _bus: u8, _address: u8, offset: u8) -> Result<u8> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if lock(&self.failing).contains(&offset) {
            return Err(PlatformError::Register {
                offset,
                reason: "simulated read failure".to_string(),
            });
        }
        lock(&self.registers)
            .get(&offset)
            .copied()
            .ok_or_else(|| PlatformError::Register {
                offset,
                reason: "no such register".to_string(),
            })
    }
}

/// Inventory held in memory
#[derive(Debug, Default)]
pub struct MemoryInventory {
    sfp: Mutex<BTreeMap<usize, bool>>,
    sfp_failing: Mutex<HashSet<usize>>,
    psu: Mutex<HashMap<(usize, String), String>>,
    sfp_reads: AtomicUsize,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug or unplug a module in the 0-based `port`
    pub fn set_sfp(&self, port: usize, present: bool) {
        lock(&self.sfp).insert(port, present);
        lock(&self.sfp_failing).remove(&port);
    }

    /// Make presence reads of `port` fail
    pub fn fail_sfp(&self, port: usize) {
        lock(&self.sfp_failing).insert(port);
    }

    pub fn set_psu_attr(&self, psu: usize, attr: &str, value: &str) {
        lock(&self.psu).insert((psu, attr.to_string()), value.to_string());
    }

    pub fn remove_psu_attr(&self, psu: usize, attr: &str) {
        lock(&self.psu).remove(&(psu, attr.to_string()));
    }

    /// Number of presence reads so far
    pub fn sfp_reads(&self) -> usize {
        self.sfp_reads.load(Ordering::SeqCst)
    }
}

impl Inventory for MemoryInventory {
    fn sfp_presence(&self, port: usize) -> Result<bool> {
        self.sfp_reads.fetch_add(1, Ordering::SeqCst);
        if lock(&self.sfp_failing).contains(&port) {
            return Err(PlatformError::Other(format!(
                "simulated presence failure on port {}",
                port
            )));
        }
        Ok(lock(&self.sfp).get(&port).copied().unwrap_or(false))
    }

    fn psu_attribute(&self, psu: usize, attr: &str) -> Option<String> {
        lock(&self.psu).get(&(psu, attr.to_string())).cloned()
    }
}

type SleepHook = Box<dyn FnMut(usize) + Send>;

/// Clock that advances only through [`Clock::sleep`].
///
/// An optional hook runs after every sleep with the number of sleeps so far,
/// which lets tests change the hardware while a blocking call waits.
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
    on_sleep: Mutex<Option<SleepHook>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
            on_sleep: Mutex::new(None),
        }
    }

    pub fn with_hook(hook: impl FnMut(usize) + Send + 'static) -> Self {
        let clock = Self::new();
        *lock(&clock.on_sleep) = Some(Box::new(hook));
        clock
    }

    /// Total time slept
    pub fn elapsed(&self) -> Duration {
        *lock(&self.elapsed)
    }

    /// Every sleep, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *lock(&self.elapsed)
    }

    fn sleep(&self, duration: Duration) {
        *lock(&self.elapsed) += duration;
        let count = {
            let mut sleeps = lock(&self.sleeps);
            sleeps.push(duration);
            sleeps.len()
        };
        if let Some(hook) = lock(&self.on_sleep).as_mut() {
            hook(count);
        }
    }
}

/// Simulated board: spinning fans, warm sensors, a few modules plugged in and
/// one known PSU.
pub fn simulated_platform(
    config: PlatformConfig,
) -> (HardwareContext, Arc<MemoryBus>, Arc<MemoryInventory>) {
    let bus = Arc::new(MemoryBus::new());
    bus.set(dbmvtx_core::board::FPGA_FW_VERSION_REG, 0x13);
    // Tachometer registers; fan6..fan8 share bytes
    for offset in (0x20..=0x2c).step_by(2) {
        bus.set(offset, 0x2e);
        bus.set(offset + 1, 0xe0);
    }
    bus.set(0x40, 0x1c);
    bus.set(0x41, 0x21);
    bus.set(0x42, 0x1f);
    bus.set(dbmvtx_core::board::TEMP_THRESHOLD_REG, 0x55);

    let inventory = Arc::new(MemoryInventory::new());
    for port in [0, 1, 4] {
        if port < config.xcvr.num_ports {
            inventory.set_sfp(port, true);
        }
    }
    if let Some(model) = config.psu.models.first() {
        inventory.set_psu_attr(1, PSU_MFR_ID_ATTR, &model.manufacturer);
        inventory.set_psu_attr(1, PSU_MODEL_NAME_ATTR, &model.model);
    }
    inventory.set_psu_attr(1, &psu_fan_rpm_attr(1), "8123.0");
    inventory.set_psu_attr(1, PSU_TEMP1_ATTR, "31500");

    let ctx = HardwareContext::new(config, bus.clone(), inventory.clone());
    (ctx, bus, inventory)
}
