//! dbmvtx-hardware
//!
//! Hardware access for the DB-MVTX9180 switch platform: FPGA register reads,
//! fan and temperature sensors, firmware components, transceiver presence
//! change detection, the hardware watchdog and the chassis that ties them
//! together. Everything in this crate is synchronous; callers serialize access.
//
//! Public API:
//! - `chassis::Chassis` - aggregate of every device on the board
//! - `watchdog::Watchdog` - hardware watchdog controller
//! - `xcvr::TransceiverMonitor` - transceiver insertion/removal detection
//! - `register::RegisterBus` / `inventory::Inventory` - hardware seams

pub mod chassis;
pub mod clock;
pub mod component;
pub mod context;
pub mod fan;
pub mod inventory;
pub mod mock;
pub mod register;
pub mod sysfs;
pub mod thermal;
pub mod watchdog;
pub mod xcvr;

pub use chassis::Chassis;
pub use clock::{Clock, SystemClock};
pub use component::Component;
pub use context::HardwareContext;
pub use fan::{Fan, FanDrawer};
pub use inventory::{Inventory, SysfsInventory};
pub use register::{I2cGetBus, RegisterBus, RegisterReader};
pub use thermal::Thermal;
pub use watchdog::{CharDevice, Watchdog, WatchdogDevice};
pub use xcvr::{Sfp, TransceiverMonitor};
