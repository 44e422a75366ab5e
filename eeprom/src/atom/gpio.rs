//! GPIO map atom payload
//!
//! Layout: bank[1], power[1], pins[28]. All three are bit-packed; the
//! field encodings go through the [`CodeTable`] lookup tables.

use crate::error::{EepromError, Result};
use crate::types::{
    CodeTable, GpioBackPower, GpioDrive, GpioFunction, GpioHysteresis, GpioPull, GpioSlew,
    GPIO_PIN_COUNT,
};
use crate::utils::field::{FieldReader, FieldWriter};

/// Bank-wide electrical settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioBank {
    /// Drive strength
    pub drive: GpioDrive,
    /// Slew rate
    pub slew: GpioSlew,
    /// Input hysteresis
    pub hysteresis: GpioHysteresis,
}

impl GpioBank {
    const DRIVE_MASK: u8 = 0x0F;
    const SLEW_SHIFT: u8 = 4;
    const HYSTERESIS_SHIFT: u8 = 6;

    /// Parse from raw byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(Self {
            drive: GpioDrive::from_code(byte & Self::DRIVE_MASK)?,
            slew: GpioSlew::from_code((byte >> Self::SLEW_SHIFT) & 0x03)?,
            hysteresis: GpioHysteresis::from_code(byte >> Self::HYSTERESIS_SHIFT)?,
        })
    }

    /// Convert to raw byte
    pub fn to_byte(&self) -> u8 {
        self.drive.to_code()
            | (self.slew.to_code() << Self::SLEW_SHIFT)
            | (self.hysteresis.to_code() << Self::HYSTERESIS_SHIFT)
    }
}

/// Power settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioPower {
    /// Back-power current the board supplies
    pub back_power: GpioBackPower,
}

impl GpioPower {
    const BACK_POWER_MASK: u8 = 0x03;

    /// Parse from raw byte (reserved bits 2-7 are ignored)
    pub fn from_byte(byte: u8) -> Result<Self> {
        Ok(Self {
            back_power: GpioBackPower::from_code(byte & Self::BACK_POWER_MASK)?,
        })
    }

    /// Convert to raw byte (reserved bits written as zero)
    pub fn to_byte(&self) -> u8 {
        self.back_power.to_code()
    }
}

/// Per-pin configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioPin {
    /// Board uses this pin
    pub used: bool,
    /// Function selector
    pub function: GpioFunction,
    /// Pull resistor
    pub pull: GpioPull,
}

impl GpioPin {
    const FUNCTION_MASK: u8 = 0x07;
    const RESERVED_MASK: u8 = 0x18;
    const PULL_SHIFT: u8 = 5;
    const USED: u8 = 0x80;

    /// A used pin with the given function and default pull
    pub fn new(function: GpioFunction) -> Self {
        Self {
            used: true,
            function,
            pull: GpioPull::Default,
        }
    }

    /// Parse from raw byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte & Self::RESERVED_MASK != 0 {
            return Err(EepromError::UnrecognizedField {
                field: "pin reserved",
                value: byte,
            });
        }
        Ok(Self {
            used: byte & Self::USED != 0,
            function: GpioFunction::from_code(byte & Self::FUNCTION_MASK)?,
            pull: GpioPull::from_code((byte >> Self::PULL_SHIFT) & 0x03)?,
        })
    }

    /// Convert to raw byte
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.function.to_code() | (self.pull.to_code() << Self::PULL_SHIFT);
        if self.used {
            byte |= Self::USED;
        }
        byte
    }
}

/// GPIO requirements for bank 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpioMap {
    /// Bank settings
    pub bank: GpioBank,
    /// Power settings
    pub power: GpioPower,
    /// Pin descriptors, indexed by GPIO number
    pub pins: [GpioPin; GPIO_PIN_COUNT],
}

impl GpioMap {
    /// Payload size (bank, power, one byte per pin)
    pub const PAYLOAD_SIZE: usize = 2 + GPIO_PIN_COUNT;

    /// Decode from an atom payload
    pub fn parse(data: &[u8], index: usize) -> Result<Self> {
        let mut r = FieldReader::new(data);
        let bank = GpioBank::from_byte(r.u8()?)?;
        let power = GpioPower::from_byte(r.u8()?)?;

        let raw: [u8; GPIO_PIN_COUNT] = r.array()?;
        let mut pins = [GpioPin::default(); GPIO_PIN_COUNT];
        for (pin, byte) in pins.iter_mut().zip(raw) {
            *pin = GpioPin::from_byte(byte)?;
        }

        if !r.is_empty() {
            return Err(EepromError::MalformedAtom { index });
        }

        Ok(Self { bank, power, pins })
    }

    /// Encode as an atom payload
    pub fn write(&self, w: &mut FieldWriter) {
        w.put_u8(self.bank.to_byte());
        w.put_u8(self.power.to_byte());
        for pin in &self.pins {
            w.put_u8(pin.to_byte());
        }
    }

    /// Pins the board marks as used, with their GPIO numbers
    pub fn used_pins(&self) -> impl Iterator<Item = (usize, &GpioPin)> + '_ {
        self.pins.iter().enumerate().filter(|(_, pin)| pin.used)
    }
}
