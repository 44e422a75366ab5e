//! HAT EEPROM Storage
//!
//! Moves encoded images between [`hat_eeprom::Image`] values and the
//! places they live: plain files, in-memory buffers, and the sysfs node
//! of the I2C EEPROM on a Raspberry Pi.
//!
//! # Architecture
//!
//! - `store` - Byte store backends (file, memory)
//! - `file` - An image bound to its store, with autoload/autosave policy
//! - `device` - Discovery of the sysfs EEPROM node via a device tree overlay
//!
//! The codec itself lives in `hat_eeprom`; its errors pass through
//! [`StorageError::Eeprom`] unchanged.
//!
//! # Usage
//!
//! ```ignore
//! use hat_eeprom_storage::{EepromFile, OpenOptions};
//!
//! let options = OpenOptions { autosave: true, ..OpenOptions::default() };
//! EepromFile::scoped("board.eep", options, |eeprom| {
//!     eeprom.set_product(b"Sample Board".as_slice())?;
//!     Ok(())
//! })?;
//! ```

#![warn(missing_docs)]

pub mod device;
pub mod error;
pub mod file;
pub mod store;

pub use device::{
    load_device, open_device, overlay_device, require_device, resolve_device, wait_for_device,
    DeviceConfig, DeviceSource, SysfsOverlay,
};
pub use error::{Result, StorageError};
pub use file::{load_path, load_reader, save_path, EepromFile, OpenOptions};
pub use store::ByteStore;
