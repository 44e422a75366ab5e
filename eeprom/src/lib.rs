//! Raspberry Pi HAT EEPROM Image Codec
//!
//! A `no_std` encoder/decoder for the configuration image stored in the
//! ID EEPROM of a HAT add-on board.
//!
//! # Overview
//!
//! The image tells the bootloader who made the board and how its GPIO
//! pins must be set up. This crate provides:
//! - Header parsing and generation ("R-Pi" signature, version, lengths)
//! - Atom framing with per-atom CRC-16 validation
//! - Vendor info and GPIO map descriptor codecs
//! - Pass-through of device tree and custom atoms
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Field layer** - Little-endian fields and the CRC-16 (`utils`)
//! 2. **Atom layer** - Framing, CRC and payload dispatch (`atom`)
//! 3. **Descriptor layer** - Vendor info and GPIO map payloads (`atom::vendor`, `atom::gpio`)
//! 4. **Image layer** - Header and ordered atom list (`image`)
//!
//! # Usage
//!
//! ```ignore
//! use hat_eeprom::{decode, encode};
//!
//! let mut image = decode(&raw)?;
//! image.set_product(b"Sample Board".as_slice())?;
//! image.pins_mut()?[4].used = true;
//!
//! // Lengths and CRCs are always recomputed
//! let raw = encode(&image)?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod atom;
pub mod error;
pub mod image;
pub mod types;
pub mod utils;

pub use error::{EepromError, Result};
pub use types::{
    AtomType, CodeTable, GpioBackPower, GpioDrive, GpioFunction, GpioHysteresis, GpioPull,
    GpioSlew, GPIO_PIN_COUNT,
};
pub use atom::{Atom, GpioBank, GpioMap, GpioPin, GpioPower, VendorInfo};
pub use image::{Header, Image};

// High-level API exports
pub use image::{decode, encode};

/// UUID type (and literal macro) used for the board serial
pub use uguid::{guid, Guid};
