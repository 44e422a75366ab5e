//! Error types for EEPROM image operations

use core::fmt;

use crate::types::AtomType;

/// Result type for EEPROM image operations
pub type Result<T> = core::result::Result<T, EepromError>;

/// Errors that can occur while decoding or encoding an EEPROM image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EepromError {
    /// Header signature is not "R-Pi"
    InvalidFormat,

    /// Header carries a format version this codec does not understand
    UnsupportedVersion(u8),

    /// A field or atom extends past the end of the available bytes
    Truncated {
        /// Offset at which the read was attempted
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes that were left
        available: usize,
    },

    /// Atom CRC does not match its contents
    ChecksumMismatch {
        /// Zero-based position of the atom in the image
        index: usize,
        /// CRC computed over the atom as read
        expected: u16,
        /// CRC stored in the atom
        actual: u16,
    },

    /// Bit pattern that has no entry in a descriptor lookup table
    UnrecognizedField {
        /// Descriptor field name
        field: &'static str,
        /// Offending raw value
        value: u8,
    },

    /// Value too wide for its on-disk field
    EncodingOverflow {
        /// Field name
        field: &'static str,
        /// Length or count that was requested
        len: usize,
        /// Largest value the field can hold
        max: usize,
    },

    /// Atom length field or payload size is inconsistent with its type
    MalformedAtom {
        /// Zero-based position of the atom in the image
        index: usize,
    },

    /// A second vendor info or GPIO map atom
    DuplicateAtom(AtomType),

    /// Image has no atom of the requested kind
    MissingAtom(AtomType),

    /// Custom atom uses a type code reserved for a structured atom
    ReservedAtomType(u16),
}

impl fmt::Display for EepromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "Not a HAT EEPROM image (bad signature)"),
            Self::UnsupportedVersion(v) => write!(f, "Unsupported EEPROM format version {}", v),
            Self::Truncated { offset, needed, available } => write!(
                f,
                "Truncated image: {} bytes needed at offset {}, {} available",
                needed, offset, available
            ),
            Self::ChecksumMismatch { index, expected, actual } => write!(
                f,
                "Atom {} checksum mismatch: computed {:#06x}, stored {:#06x}",
                index, expected, actual
            ),
            Self::UnrecognizedField { field, value } => {
                write!(f, "Unrecognized {} code {:#04x}", field, value)
            }
            Self::EncodingOverflow { field, len, max } => {
                write!(f, "{} too long: {} exceeds maximum {}", field, len, max)
            }
            Self::MalformedAtom { index } => write!(f, "Atom {} is malformed", index),
            Self::DuplicateAtom(kind) => write!(f, "Image already has a {} atom", kind),
            Self::MissingAtom(kind) => write!(f, "Image has no {} atom", kind),
            Self::ReservedAtomType(code) => {
                write!(f, "Atom type {:#06x} is reserved for a structured atom", code)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EepromError {}
