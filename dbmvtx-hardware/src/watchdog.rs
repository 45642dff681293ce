//! Hardware watchdog control
//!
//! The watchdog is driven through the Linux watchdog character device
//! (`/dev/watchdogN`) using the `WDIOC_*` ioctls, while its armed state and
//! remaining time are read back from the companion sysfs directory
//! (`/sys/class/watchdog/watchdogN/`).
//!
//! The device handle is opened write-only on the first control call and kept
//! open until the controller is dropped.

use dbmvtx_core::board::WATCHDOG_MAX_TIMEOUT_SECS;
use dbmvtx_core::{PlatformError, Result};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::sysfs;

/// Option flag turning the watchdog off
pub const WDIOS_DISABLECARD: i32 = 0x0001;
/// Option flag turning the watchdog on
pub const WDIOS_ENABLECARD: i32 = 0x0002;

/// Value returned by [`Watchdog::arm`] and [`Watchdog::remaining_time`] on failure
pub const WD_COMMON_ERROR: i32 = -1;

mod ioctl {
    use nix::libc::c_int;
    use nix::{ioctl_read, ioctl_readwrite};

    const WATCHDOG_IOCTL_BASE: u8 = b'W';

    ioctl_read!(wdioc_setoptions, WATCHDOG_IOCTL_BASE, 4, c_int);
    ioctl_read!(wdioc_keepalive, WATCHDOG_IOCTL_BASE, 5, c_int);
    ioctl_readwrite!(wdioc_settimeout, WATCHDOG_IOCTL_BASE, 6, c_int);
    ioctl_read!(wdioc_gettimeout, WATCHDOG_IOCTL_BASE, 7, c_int);
    ioctl_read!(wdioc_gettimeleft, WATCHDOG_IOCTL_BASE, 10, c_int);
}

/// Control operations of a watchdog device
pub trait WatchdogDevice: Send {
    /// `WDIOC_SETOPTIONS` with one of the `WDIOS_*` flags
    fn set_options(&mut self, options: i32) -> Result<()>;

    /// `WDIOC_KEEPALIVE`
    fn keepalive(&mut self) -> Result<()>;

    /// `WDIOC_SETTIMEOUT`, returning the timeout the hardware applied
    fn set_timeout(&mut self, seconds: i32) -> Result<i32>;

    /// `WDIOC_GETTIMEOUT`
    fn get_timeout(&mut self) -> Result<i32>;

    /// `WDIOC_GETTIMELEFT`
    fn get_timeleft(&mut self) -> Result<i32>;
}

/// Watchdog character device, opened lazily
#[derive(Debug)]
pub struct CharDevice {
    path: PathBuf,
    file: Option<File>,
}

impl CharDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the device handle has been opened
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn handle(&mut self) -> Result<&File> {
        if self.file.is_none() {
            let file = OpenOptions::new().write(true).open(&self.path)?;
            debug!("Opened watchdog device {}", self.path.display());
            self.file = Some(file);
        }
        self.file
            .as_ref()
            .ok_or_else(|| PlatformError::Watchdog("device handle unavailable".to_string()))
    }

    fn ioctl_int(
        &mut self,
        op: unsafe fn(nix::libc::c_int, *mut nix::libc::c_int) -> nix::Result<nix::libc::c_int>,
        value: i32,
    ) -> Result<i32> {
        let fd = self.handle()?.as_raw_fd();
        let mut arg: nix::libc::c_int = value;
        // SAFETY: fd is an open watchdog device and arg outlives the call
        unsafe { op(fd, &mut arg) }.map_err(std::io::Error::from)?;
        Ok(arg)
    }
}

impl WatchdogDevice for CharDevice {
    fn set_options(&mut self, options: i32) -> Result<()> {
        self.ioctl_int(ioctl::wdioc_setoptions, options).map(|_| ())
    }

    fn keepalive(&mut self) -> Result<()> {
        self.ioctl_int(ioctl::wdioc_keepalive, 0).map(|_| ())
    }

    fn set_timeout(&mut self, seconds: i32) -> Result<i32> {
        self.ioctl_int(ioctl::wdioc_settimeout, seconds)
    }

    fn get_timeout(&mut self) -> Result<i32> {
        self.ioctl_int(ioctl::wdioc_gettimeout, 0)
    }

    fn get_timeleft(&mut self) -> Result<i32> {
        self.ioctl_int(ioctl::wdioc_gettimeleft, 0)
    }
}

impl Drop for CharDevice {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed watchdog device {}", self.path.display());
        }
    }
}

/// Hardware watchdog controller
#[derive(Debug)]
pub struct Watchdog<D: WatchdogDevice = CharDevice> {
    device: D,
    sysfs_dir: PathBuf,
    timeout: u32,
}

impl Watchdog<CharDevice> {
    /// Controller for the watchdog character device at `device_path`
    pub fn open(device_path: impl Into<PathBuf>, sysfs_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_device(CharDevice::new(device_path), sysfs_dir)
    }
}

impl<D: WatchdogDevice> Watchdog<D> {
    /// Controller over an arbitrary device.
    ///
    /// Fails when the sysfs directory does not exist. The tracked timeout is
    /// seeded from sysfs `timeout`, or 0 when it cannot be read.
    pub fn with_device(device: D, sysfs_dir: impl Into<PathBuf>) -> Result<Self> {
        let sysfs_dir = sysfs_dir.into();
        if !sysfs_dir.is_dir() {
            return Err(PlatformError::Watchdog(format!(
                "sysfs directory {} not found",
                sysfs_dir.display()
            )));
        }

        let timeout = sysfs::read_int(&sysfs_dir.join("timeout"))
            .ok()
            .and_then(|t| u32::try_from(t).ok())
            .unwrap_or(0);

        Ok(Self {
            device,
            sysfs_dir,
            timeout,
        })
    }

    /// Arm the watchdog with a timeout of `seconds`, or feed it if already armed.
    ///
    /// Returns the timeout in effect, or -1 when `seconds` is outside 0-340 or
    /// the hardware rejected a control call.
    pub fn arm(&mut self, seconds: i32) -> i32 {
        info!("Arming watchdog with {}s timeout", seconds);
        match self.try_arm(seconds) {
            Ok(timeout) => timeout as i32,
            Err(e) => {
                warn!("Failed to arm watchdog: {}", e);
                WD_COMMON_ERROR
            }
        }
    }

    /// Arm the watchdog, reporting why it failed
    pub fn try_arm(&mut self, seconds: i32) -> Result<u32> {
        let requested = u32::try_from(seconds)
            .ok()
            .filter(|s| *s <= WATCHDOG_MAX_TIMEOUT_SECS)
            .ok_or_else(|| {
                PlatformError::InvalidInput(format!(
                    "watchdog timeout must be 0-{} seconds, got {}",
                    WATCHDOG_MAX_TIMEOUT_SECS, seconds
                ))
            })?;

        if self.timeout != requested {
            let applied = self.device.set_timeout(seconds)?;
            self.timeout = u32::try_from(applied).unwrap_or(0);
            debug!("Watchdog timeout set to {}s", self.timeout);
        }

        if self.is_armed() {
            self.device.keepalive()?;
        } else {
            self.device.set_options(WDIOS_ENABLECARD)?;
        }

        Ok(self.timeout)
    }

    /// Turn the watchdog off. Returns false when the hardware rejected the call.
    pub fn disarm(&mut self) -> bool {
        info!("Disarming watchdog");
        match self.try_disarm() {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to disarm watchdog: {}", e);
                false
            }
        }
    }

    pub fn try_disarm(&mut self) -> Result<()> {
        self.device.set_options(WDIOS_DISABLECARD)?;
        self.timeout = 0;
        Ok(())
    }

    /// Whether the hardware reports the watchdog as running
    pub fn is_armed(&self) -> bool {
        sysfs::read_trimmed(&self.sysfs_dir.join("state"))
            .map(|state| state == "active")
            .unwrap_or(false)
    }

    /// Seconds before expiry; -1 when disarmed or unreadable
    pub fn remaining_time(&self) -> i32 {
        if !self.is_armed() {
            return WD_COMMON_ERROR;
        }
        sysfs::read_int(&self.sysfs_dir.join("timeleft"))
            .ok()
            .and_then(|t| i32::try_from(t).ok())
            .unwrap_or(WD_COMMON_ERROR)
    }

    /// Timeout last applied to the hardware, in seconds
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}
