//! Atom framing
//!
//! Every atom is framed the same way:
//!
//! ```text
//! type[2] count[2] length[4] payload[length - 2] crc[2]
//! ```
//!
//! `length` covers the payload and the CRC. The CRC covers everything
//! before it, framing fields included. The count field normally holds the
//! atom's position in the image and is regenerated on encode. Opaque atoms
//! remember a count that differs from their position and write it back.

pub mod gpio;
pub mod vendor;

use alloc::vec::Vec;
use log::{debug, trace};

use crate::error::{EepromError, Result};
use crate::types::{AtomType, ATOM_HEADER_SIZE, CRC_SIZE};
use crate::utils::checksum::{checksum, verify_checksum};
use crate::utils::field::{len_u16, len_u32, FieldReader, FieldWriter};

pub use gpio::{GpioBank, GpioMap, GpioPin, GpioPower};
pub use vendor::VendorInfo;

/// A single record in the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// Board identity
    VendorInfo(VendorInfo),
    /// GPIO requirements
    GpioMap(GpioMap),
    /// Linux device tree overlay blob, carried verbatim
    DeviceTree {
        /// Blob contents
        data: Vec<u8>,
        /// Count field, when it is not the atom's position
        count: Option<u16>,
    },
    /// Manufacturer data or an atom type this codec does not know
    Custom {
        /// Raw type code
        atom_type: u16,
        /// Payload, carried verbatim
        data: Vec<u8>,
        /// Count field, when it is not the atom's position
        count: Option<u16>,
    },
}

impl Atom {
    /// Device tree blob atom (type 0x0003)
    pub fn device_tree(data: Vec<u8>) -> Self {
        Self::DeviceTree { data, count: None }
    }

    /// Manufacturer custom data atom (type 0x0004)
    pub fn manufacturer(data: Vec<u8>) -> Self {
        Self::Custom {
            atom_type: AtomType::MANUFACTURER_CUSTOM,
            data,
            count: None,
        }
    }

    /// Opaque atom with an arbitrary type code
    ///
    /// Fails for the codes of the structured atoms, which would not
    /// decode back to an opaque atom.
    pub fn custom(atom_type: u16, data: Vec<u8>) -> Result<Self> {
        let atom = Self::Custom {
            atom_type,
            data,
            count: None,
        };
        atom.check_type()?;
        Ok(atom)
    }

    /// Kind of atom
    pub fn kind(&self) -> AtomType {
        AtomType::from_code(self.type_code())
    }

    /// Raw type code written to the frame
    pub fn type_code(&self) -> u16 {
        match self {
            Self::VendorInfo(_) => AtomType::VENDOR_INFO,
            Self::GpioMap(_) => AtomType::GPIO_MAP,
            Self::DeviceTree { .. } => AtomType::DEVICE_TREE,
            Self::Custom { atom_type, .. } => *atom_type,
        }
    }

    /// Payload size in bytes
    pub fn payload_len(&self) -> usize {
        match self {
            Self::VendorInfo(info) => info.payload_len(),
            Self::GpioMap(_) => GpioMap::PAYLOAD_SIZE,
            Self::DeviceTree { data, .. } | Self::Custom { data, .. } => data.len(),
        }
    }

    /// Count field carried by an opaque atom
    ///
    /// `None` means the count is the atom's position, which is what
    /// structured atoms always use.
    pub fn count(&self) -> Option<u16> {
        match self {
            Self::DeviceTree { count, .. } | Self::Custom { count, .. } => *count,
            _ => None,
        }
    }

    /// Pin the count field of an opaque atom (ignored for structured atoms)
    pub fn with_count(mut self, value: u16) -> Self {
        if let Self::DeviceTree { count, .. } | Self::Custom { count, .. } = &mut self {
            *count = Some(value);
        }
        self
    }

    /// Size of the complete frame
    pub fn encoded_len(&self) -> usize {
        ATOM_HEADER_SIZE + self.payload_len() + CRC_SIZE
    }

    pub(crate) fn check_type(&self) -> Result<()> {
        match self {
            Self::Custom { atom_type, .. } => match AtomType::from_code(*atom_type) {
                AtomType::Custom(_) => Ok(()),
                _ => Err(EepromError::ReservedAtomType(*atom_type)),
            },
            _ => Ok(()),
        }
    }

    fn parse_payload(atom_type: u16, count: u16, payload: &[u8], index: usize) -> Result<Self> {
        let count = (usize::from(count) != index).then_some(count);
        Ok(match AtomType::from_code(atom_type) {
            AtomType::VendorInfo => Self::VendorInfo(VendorInfo::parse(payload, index)?),
            AtomType::GpioMap => Self::GpioMap(GpioMap::parse(payload, index)?),
            AtomType::DeviceTree => Self::DeviceTree {
                data: payload.to_vec(),
                count,
            },
            AtomType::Custom(code) => Self::Custom {
                atom_type: code,
                data: payload.to_vec(),
                count,
            },
        })
    }

    fn write_payload(&self, w: &mut FieldWriter) -> Result<()> {
        match self {
            Self::VendorInfo(info) => info.write(w),
            Self::GpioMap(map) => {
                map.write(w);
                Ok(())
            }
            Self::DeviceTree { data, .. } | Self::Custom { data, .. } => {
                w.put_bytes(data);
                Ok(())
            }
        }
    }
}

/// Read the atom at the reader's position
///
/// `index` is the atom's position in the image. It is used in errors and
/// to tell whether the count field needs to be kept.
pub fn read_atom(r: &mut FieldReader<'_>, index: usize) -> Result<Atom> {
    let offset = r.position();

    let mut header = r.clone();
    let atom_type = header.u16()?;
    let count = header.u16()?;
    let length = header.u32()? as usize;

    if length < CRC_SIZE {
        return Err(EepromError::MalformedAtom { index });
    }

    let frame_len = length
        .checked_add(ATOM_HEADER_SIZE)
        .ok_or(EepromError::Truncated {
            offset,
            needed: usize::MAX,
            available: r.remaining(),
        })?;
    let frame = r.bytes(frame_len)?;

    let (covered, stored) = frame.split_at(frame.len() - CRC_SIZE);
    let actual = u16::from_le_bytes([stored[0], stored[1]]);
    if !verify_checksum(covered, actual) {
        let expected = checksum(covered);
        debug!(
            "atom {} at offset {}: CRC {:#06x} does not match stored {:#06x}",
            index, offset, expected, actual
        );
        return Err(EepromError::ChecksumMismatch {
            index,
            expected,
            actual,
        });
    }

    trace!(
        "atom {}: type {:#06x}, count {}, {} payload bytes",
        index,
        atom_type,
        count,
        length - CRC_SIZE
    );

    Atom::parse_payload(atom_type, count, &covered[ATOM_HEADER_SIZE..], index)
}

/// Append a framed atom, computing its length and CRC from the
/// freshly serialized payload
pub fn write_atom(w: &mut FieldWriter, index: usize, atom: &Atom) -> Result<()> {
    atom.check_type()?;

    let mut payload = FieldWriter::with_capacity(atom.payload_len());
    atom.write_payload(&mut payload)?;
    let payload = payload.into_inner();

    let count = match atom.count() {
        Some(count) => count,
        None => len_u16("atom count", index)?,
    };
    let length = payload
        .len()
        .checked_add(CRC_SIZE)
        .ok_or(EepromError::EncodingOverflow {
            field: "atom length",
            len: payload.len(),
            max: u32::MAX as usize - CRC_SIZE,
        })
        .and_then(|len| len_u32("atom length", len))?;

    let start = w.len();
    w.put_u16(atom.type_code());
    w.put_u16(count);
    w.put_u32(length);
    w.put_bytes(&payload);
    let crc = checksum(&w.as_slice()[start..]);
    w.put_u16(crc);

    trace!(
        "atom {}: wrote type {:#06x}, {} payload bytes, CRC {:#06x}",
        index,
        atom.type_code(),
        payload.len(),
        crc
    );
    Ok(())
}
