//! Static board tables for the DB-MVTX9180
//!
//! Register offsets inside the system FPGA and the firmware component list.
//! All of this is fixed by the board design and never changes at runtime.

/// Default I2C bus the system FPGA sits on
pub const FPGA_I2C_BUS: u8 = 1;

/// Default I2C address of the system FPGA
pub const FPGA_DEV_ADDR: u8 = 0x32;

/// FPGA register holding the firmware version byte
pub const FPGA_FW_VERSION_REG: u8 = 0x00;

/// FPGA register holding the temperature threshold.
///
/// The same register backs both the high and the high-critical threshold.
pub const TEMP_THRESHOLD_REG: u8 = 0x50;

/// Highest timeout the watchdog hardware accepts, in seconds
pub const WATCHDOG_MAX_TIMEOUT_SECS: u32 = 340;

/// Fan tachometer registers, keyed by sensor attribute.
///
/// Each RPM value spans two registers: high byte at the offset, low byte at
/// offset + 1.
pub const FAN_RPM_REGISTERS: [(&str, u8); 8] = [
    ("fan1_input", 0x20),
    ("fan2_input", 0x22),
    ("fan3_input", 0x24),
    ("fan4_input", 0x26),
    ("fan5_input", 0x28),
    ("fan6_input", 0x2a),
    ("fan7_input", 0x2b),
    ("fan8_input", 0x2c),
];

/// Temperature registers, keyed by sensor attribute
pub const TEMP_REGISTERS: [(&str, u8); 3] = [
    ("temp1_input", 0x40),
    ("temp2_input", 0x41),
    ("temp3_input", 0x42),
];

/// Human-readable temperature sensor labels
pub const TEMP_LABELS: [(&str, &str); 3] = [
    ("temp1_sensor", "Internal Temp Sensor"),
    ("temp2_sensor", "External-A Temp Sensor"),
    ("temp3_sensor", "External-B Temp Sensor"),
];

/// Firmware components, indexed by component identity
pub const COMPONENTS: [(&str, &str); 2] = [
    ("BIOS", "Basic Input/Output System"),
    ("SysFPGA", "System FPGA"),
];

fn lookup<V: Copy>(table: &[(&str, V)], key: &str) -> Option<V> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// RPM register offset for a 1-based chassis fan index
pub fn fan_rpm_register(fan_index: usize) -> Option<u8> {
    lookup(&FAN_RPM_REGISTERS, &format!("fan{}_input", fan_index))
}

/// Temperature register offset for a 1-based thermal index
pub fn temp_register(thermal_index: usize) -> Option<u8> {
    lookup(&TEMP_REGISTERS, &format!("temp{}_input", thermal_index))
}

/// Label for a 1-based thermal index
pub fn temp_label(thermal_index: usize) -> Option<&'static str> {
    lookup(&TEMP_LABELS, &format!("temp{}_sensor", thermal_index))
}
