//! EEPROM device discovery
//!
//! On a Pi the HAT EEPROM shows up as a sysfs node once the matching I2C
//! device exists. When it does not, it can be instantiated by loading a
//! device tree overlay through configfs. [`DeviceSource`] abstracts that
//! so the polling logic can be driven without real hardware.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use hat_eeprom::Image;
use log::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::file::{load_path, EepromFile, OpenOptions};

/// Default sysfs node of the HAT EEPROM
pub const DEFAULT_EEPROM_PATH: &str = "/sys/class/i2c-adapter/i2c-99/99-0050/eeprom";

/// Default configfs directory the overlay is loaded through
pub const DEFAULT_OVERLAY_DIR: &str = "/sys/kernel/config/device-tree/overlays/ideeprom";

/// A place an EEPROM device node may appear
pub trait DeviceSource {
    /// Path of the device node
    fn device_path(&self) -> &Path;

    /// Whether the device node exists right now
    fn is_present(&self) -> bool {
        self.device_path().exists()
    }

    /// Ask the system to create the device node
    fn trigger(&self) -> io::Result<()>;

    /// Delay between presence checks while waiting
    fn wait_interval(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Longest time to wait for the node after a trigger
    fn wait_max(&self) -> Duration {
        Duration::from_secs(2)
    }
}

impl<D: DeviceSource + ?Sized> DeviceSource for &D {
    fn device_path(&self) -> &Path {
        (**self).device_path()
    }

    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn trigger(&self) -> io::Result<()> {
        (**self).trigger()
    }

    fn wait_interval(&self) -> Duration {
        (**self).wait_interval()
    }

    fn wait_max(&self) -> Duration {
        (**self).wait_max()
    }
}

/// Paths and timing for [`SysfsOverlay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// EEPROM device node
    pub eeprom_path: PathBuf,
    /// configfs overlay directory
    pub overlay_dir: PathBuf,
    /// Compiled overlay (`.dtbo`) that instantiates the EEPROM device
    pub overlay_blob: Vec<u8>,
    /// Delay between presence checks
    pub wait_interval: Duration,
    /// Longest time to wait after loading the overlay
    pub wait_max: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            eeprom_path: PathBuf::from(DEFAULT_EEPROM_PATH),
            overlay_dir: PathBuf::from(DEFAULT_OVERLAY_DIR),
            overlay_blob: Vec::new(),
            wait_interval: Duration::from_millis(100),
            wait_max: Duration::from_secs(2),
        }
    }
}

impl DeviceConfig {
    /// Default paths with the given overlay blob
    pub fn with_overlay(overlay_blob: impl Into<Vec<u8>>) -> Self {
        Self {
            overlay_blob: overlay_blob.into(),
            ..Self::default()
        }
    }
}

/// Device source that loads a device tree overlay through configfs
///
/// Triggering fails with `InvalidInput` when no overlay blob is configured.
#[derive(Debug, Clone)]
pub struct SysfsOverlay {
    config: DeviceConfig,
}

impl SysfsOverlay {
    /// Create from a configuration
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl DeviceSource for SysfsOverlay {
    fn device_path(&self) -> &Path {
        &self.config.eeprom_path
    }

    fn trigger(&self) -> io::Result<()> {
        if self.config.overlay_blob.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no EEPROM overlay blob configured",
            ));
        }
        match fs::create_dir(&self.config.overlay_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
        let dtbo = self.config.overlay_dir.join("dtbo");
        fs::write(&dtbo, &self.config.overlay_blob)?;
        info!(
            "loaded {} byte EEPROM overlay via {}",
            self.config.overlay_blob.len(),
            dtbo.display()
        );
        Ok(())
    }

    fn wait_interval(&self) -> Duration {
        self.config.wait_interval
    }

    fn wait_max(&self) -> Duration {
        self.config.wait_max
    }
}

/// Poll until the device node appears or `max` elapses
pub fn wait_for_device<D: DeviceSource>(source: &D, interval: Duration, max: Duration) -> bool {
    let start = Instant::now();
    loop {
        if source.is_present() {
            debug!(
                "{} present after {:?}",
                source.device_path().display(),
                start.elapsed()
            );
            return true;
        }
        let elapsed = start.elapsed();
        if elapsed >= max {
            warn!(
                "{} did not appear within {:?}",
                source.device_path().display(),
                max
            );
            return false;
        }
        thread::sleep(interval.min(max - elapsed));
    }
}

/// Trigger the device source, then wait for the node
pub fn overlay_device<D: DeviceSource>(
    source: &D,
    interval: Duration,
    max: Duration,
) -> Result<bool> {
    source.trigger()?;
    Ok(wait_for_device(source, interval, max))
}

/// Path of the device node, creating it first when `autocreate` is set
///
/// The trigger runs at most once. The path is returned even if the node
/// never appeared; opening it then fails with `NotFound`.
pub fn resolve_device<D: DeviceSource>(source: &D, autocreate: bool) -> Result<PathBuf> {
    if autocreate && !source.is_present() {
        debug!(
            "{} absent, triggering device creation",
            source.device_path().display()
        );
        overlay_device(source, source.wait_interval(), source.wait_max())?;
    }
    Ok(source.device_path().to_path_buf())
}

/// Like [`resolve_device`], but fails if the node is still absent
pub fn require_device<D: DeviceSource>(source: &D, autocreate: bool) -> Result<PathBuf> {
    let path = resolve_device(source, autocreate)?;
    if !source.is_present() {
        return Err(StorageError::DeviceTimeout { path });
    }
    Ok(path)
}

/// Open the EEPROM device as an [`EepromFile`]
pub fn open_device<D: DeviceSource>(
    source: &D,
    autocreate: bool,
    options: OpenOptions,
) -> Result<EepromFile<File>> {
    let path = resolve_device(source, autocreate)?;
    EepromFile::open(path, options)
}

/// Read and decode the EEPROM device
pub fn load_device<D: DeviceSource>(source: &D, autocreate: bool) -> Result<Image> {
    let path = resolve_device(source, autocreate)?;
    load_path(path)
}
