//! Common test utilities for storage tests

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hat_eeprom_storage::DeviceSource;

/// Known-good image with vendor info and GPIO map atoms
pub const SAMPLE: &[u8] = include_bytes!("../../../eeprom/tests/files/sample.eep");

/// Known-good image with device tree and custom atoms
pub const SPIDEV: &[u8] = include_bytes!("../../../eeprom/tests/files/spidev.eep");

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh empty directory under the system temp dir
pub fn unique_temp_dir(tag: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_micros();
    let seq = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "hat-eeprom-{tag}-{}-{now}-{seq}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Temp file holding `data`
pub fn temp_image(tag: &str, data: &[u8]) -> PathBuf {
    let path = unique_temp_dir(tag).join("eeprom.eep");
    fs::write(&path, data).expect("write image");
    path
}

/// Device source backed by a plain file that may appear when triggered
pub struct FakeDevice {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub appear_on_trigger: bool,
    pub triggers: Cell<usize>,
}

impl FakeDevice {
    /// Device at `dir/eeprom` that is absent until triggered
    pub fn absent(dir: &Path, contents: &[u8], appear_on_trigger: bool) -> Self {
        Self {
            path: dir.join("eeprom"),
            contents: contents.to_vec(),
            appear_on_trigger,
            triggers: Cell::new(0),
        }
    }

    /// Device at `dir/eeprom` that already exists
    pub fn present(dir: &Path, contents: &[u8]) -> Self {
        let device = Self::absent(dir, contents, false);
        fs::write(&device.path, contents).expect("write device");
        device
    }
}

impl DeviceSource for FakeDevice {
    fn device_path(&self) -> &Path {
        &self.path
    }

    fn trigger(&self) -> io::Result<()> {
        self.triggers.set(self.triggers.get() + 1);
        if self.appear_on_trigger {
            fs::write(&self.path, &self.contents)?;
        }
        Ok(())
    }

    fn wait_interval(&self) -> Duration {
        Duration::from_millis(5)
    }

    fn wait_max(&self) -> Duration {
        Duration::from_millis(50)
    }
}
