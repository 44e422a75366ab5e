//! Common types and constants for HAT EEPROM images

use core::fmt;

use crate::error::{EepromError, Result};

/// Header signature "R-Pi"
pub const SIGNATURE: [u8; 4] = *b"R-Pi";

/// Only header version defined by the HAT specification
pub const FORMAT_VERSION: u8 = 0x01;

/// Header size (signature, version, reserved, atom count, image length)
pub const HEADER_SIZE: usize = 12;

/// Atom framing before the payload (type, count, length)
pub const ATOM_HEADER_SIZE: usize = 8;

/// Size of the trailing atom CRC
pub const CRC_SIZE: usize = 2;

/// Number of addressable GPIO pins in a GPIO map (bank 0, GPIO0-27)
pub const GPIO_PIN_COUNT: usize = 28;

/// Kind of atom, as identified by its type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomType {
    /// Vendor info (0x0001)
    VendorInfo,
    /// GPIO map (0x0002)
    GpioMap,
    /// Linux device tree blob (0x0003)
    DeviceTree,
    /// Manufacturer custom data (0x0004) or any unknown type code
    Custom(u16),
}

impl AtomType {
    /// Vendor info type code
    pub const VENDOR_INFO: u16 = 0x0001;
    /// GPIO map type code
    pub const GPIO_MAP: u16 = 0x0002;
    /// Linux device tree blob type code
    pub const DEVICE_TREE: u16 = 0x0003;
    /// Manufacturer custom data type code
    pub const MANUFACTURER_CUSTOM: u16 = 0x0004;

    /// Classify a raw type code
    pub fn from_code(code: u16) -> Self {
        match code {
            Self::VENDOR_INFO => Self::VendorInfo,
            Self::GPIO_MAP => Self::GpioMap,
            Self::DEVICE_TREE => Self::DeviceTree,
            other => Self::Custom(other),
        }
    }

    /// Raw type code
    pub fn code(self) -> u16 {
        match self {
            Self::VendorInfo => Self::VENDOR_INFO,
            Self::GpioMap => Self::GPIO_MAP,
            Self::DeviceTree => Self::DEVICE_TREE,
            Self::Custom(code) => code,
        }
    }

    /// Whether an image may hold at most one atom of this kind
    pub fn is_unique(self) -> bool {
        matches!(self, Self::VendorInfo | Self::GpioMap)
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VendorInfo => write!(f, "vendor info"),
            Self::GpioMap => write!(f, "GPIO map"),
            Self::DeviceTree => write!(f, "device tree"),
            Self::Custom(code) => write!(f, "custom ({:#06x})", code),
        }
    }
}

/// Bidirectional mapping between an enum and its on-disk bit pattern
///
/// Codes are listed explicitly rather than derived from discriminants:
/// several GPIO fields use hardware numbering that is not monotonic in
/// the logical order of the variants.
pub trait CodeTable: Copy + PartialEq + Sized + 'static {
    /// Field name reported in errors
    const FIELD: &'static str;

    /// Every variant paired with its code
    const TABLE: &'static [(Self, u8)];

    /// Look up the variant for a raw code
    fn from_code(code: u8) -> Result<Self> {
        Self::TABLE
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(v, _)| *v)
            .ok_or(EepromError::UnrecognizedField {
                field: Self::FIELD,
                value: code,
            })
    }

    /// Raw code for a variant
    fn to_code(self) -> u8;
}

/// Implement [`CodeTable`] from `Variant => code` pairs
///
/// Generates both the lookup table and an exhaustive `to_code` match, so
/// a variant missing from the table does not compile.
macro_rules! code_table {
    ($ty:ty, $field:literal, { $($variant:ident => $code:expr),+ $(,)? }) => {
        impl CodeTable for $ty {
            const FIELD: &'static str = $field;
            const TABLE: &'static [(Self, u8)] = &[$((Self::$variant, $code)),+];

            fn to_code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }
    };
}

/// GPIO bank drive strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioDrive {
    /// Leave at firmware default
    #[default]
    Default,
    /// 2 mA
    Ma2,
    /// 4 mA
    Ma4,
    /// 6 mA
    Ma6,
    /// 8 mA
    Ma8,
    /// 10 mA
    Ma10,
    /// 12 mA
    Ma12,
    /// 14 mA
    Ma14,
    /// 16 mA
    Ma16,
}

code_table!(GpioDrive, "drive", {
    Default => 0,
    Ma2 => 1,
    Ma4 => 2,
    Ma6 => 3,
    Ma8 => 4,
    Ma10 => 5,
    Ma12 => 6,
    Ma14 => 7,
    Ma16 => 8,
});

/// GPIO bank slew rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioSlew {
    /// Leave at firmware default
    #[default]
    Default,
    /// Slew rate limiting enabled
    Limited,
    /// Slew rate limiting disabled
    Unlimited,
}

code_table!(GpioSlew, "slew", {
    Default => 0,
    Limited => 1,
    Unlimited => 2,
});

/// GPIO bank input hysteresis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioHysteresis {
    /// Leave at firmware default
    #[default]
    Default,
    /// Hysteresis disabled
    Disabled,
    /// Hysteresis enabled
    Enabled,
}

code_table!(GpioHysteresis, "hysteresis", {
    Default => 0,
    Disabled => 1,
    Enabled => 2,
});

/// Current the board back-powers the Pi with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioBackPower {
    /// Board does not back-power the Pi
    #[default]
    None,
    /// Board supplies at least 1.3 A
    Ma1300,
    /// Board supplies at least 2 A
    Ma2000,
}

code_table!(GpioBackPower, "back power", {
    None => 0,
    Ma1300 => 1,
    Ma2000 => 2,
});

/// Pin function selector
///
/// `Input` doubles as the default: the 3-bit field has no spare code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioFunction {
    /// Input (default)
    #[default]
    Input,
    /// Output
    Output,
    /// Alternate function 0
    Alt0,
    /// Alternate function 1
    Alt1,
    /// Alternate function 2
    Alt2,
    /// Alternate function 3
    Alt3,
    /// Alternate function 4
    Alt4,
    /// Alternate function 5
    Alt5,
}

// BCM283x FSEL numbering: ALT0-3 are 4-7, ALT4 is 3, ALT5 is 2
code_table!(GpioFunction, "function", {
    Input => 0b000,
    Output => 0b001,
    Alt5 => 0b010,
    Alt4 => 0b011,
    Alt0 => 0b100,
    Alt1 => 0b101,
    Alt2 => 0b110,
    Alt3 => 0b111,
});

/// Pin pull resistor selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpioPull {
    /// Leave at firmware default
    #[default]
    Default,
    /// Pull up
    Up,
    /// Pull down
    Down,
    /// No pull
    None,
}

code_table!(GpioPull, "pull", {
    Default => 0,
    Up => 1,
    Down => 2,
    None => 3,
});
