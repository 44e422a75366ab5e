//! Image header and atom list
//!
//! An image is a 12-byte header followed by `atom_count` atoms:
//!
//! ```text
//! signature[4] version[1] reserved[1] atom_count[2] image_len[4]
//! ```
//!
//! The header's image length is informational. Decoding trusts the
//! per-atom framing and ignores anything after the last atom (EEPROMs
//! are larger than the image and padded with 0xFF).

use alloc::vec::Vec;
use log::debug;
use uguid::Guid;

use crate::atom::{
    read_atom, write_atom, Atom, GpioBank, GpioMap, GpioPin, GpioPower, VendorInfo,
};
use crate::error::{EepromError, Result};
use crate::types::{
    AtomType, ATOM_HEADER_SIZE, CRC_SIZE, FORMAT_VERSION, GPIO_PIN_COUNT, HEADER_SIZE, SIGNATURE,
};
use crate::utils::field::{len_u16, len_u32, FieldReader, FieldWriter};

/// Decoded image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version
    pub version: u8,
    /// Number of atoms that follow
    pub atom_count: u16,
    /// Declared total image length
    pub image_len: u32,
}

impl Header {
    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
            return Err(EepromError::InvalidFormat);
        }

        let mut r = FieldReader::new(data);
        let _signature: [u8; 4] = r.array()?;
        let version = r.u8()?;
        let _reserved = r.u8()?;
        let atom_count = r.u16()?;
        let image_len = r.u32()?;

        if version != FORMAT_VERSION {
            return Err(EepromError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            atom_count,
            image_len,
        })
    }

    fn write(&self, w: &mut FieldWriter) {
        w.put_bytes(&SIGNATURE);
        w.put_u8(self.version);
        w.put_u8(0);
        w.put_u16(self.atom_count);
        w.put_u32(self.image_len);
    }
}

/// A decoded HAT EEPROM image
///
/// Holds the atoms in their on-disk order. At most one vendor info and
/// one GPIO map atom may be present; the accessors for their fields
/// fail with [`EepromError::MissingAtom`] when the atom is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    version: u8,
    atoms: Vec<Atom>,
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

impl Image {
    /// Empty image
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            atoms: Vec::new(),
        }
    }

    /// Image with the usual vendor info and GPIO map atoms
    pub fn with_board(info: VendorInfo, gpio: GpioMap) -> Self {
        Self {
            version: FORMAT_VERSION,
            atoms: alloc::vec![Atom::VendorInfo(info), Atom::GpioMap(gpio)],
        }
    }

    /// Decode an image from raw bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = Header::parse(data)?;
        debug!(
            "header: version {}, {} atoms, {} bytes declared",
            header.version, header.atom_count, header.image_len
        );

        let mut r = FieldReader::new(data);
        r.bytes(HEADER_SIZE)?;

        let mut image = Self {
            version: header.version,
            atoms: Vec::with_capacity(atom_capacity(header.atom_count, r.remaining())),
        };
        for index in 0..header.atom_count as usize {
            let atom = read_atom(&mut r, index)?;
            image.push_atom(atom)?;
        }

        Ok(image)
    }

    /// Encode the image, recomputing the header, lengths and CRCs
    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = Header {
            version: self.version,
            atom_count: len_u16("atom count", self.atoms.len())?,
            image_len: len_u32("image length", self.encoded_len())?,
        };

        let mut w = FieldWriter::with_capacity(header.image_len as usize);
        header.write(&mut w);
        for (index, atom) in self.atoms.iter().enumerate() {
            write_atom(&mut w, index, atom)?;
        }

        debug!("encoded {} atoms, {} bytes", header.atom_count, w.len());
        Ok(w.into_inner())
    }

    /// Size of the encoded image
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.atoms.iter().map(Atom::encoded_len).sum::<usize>()
    }

    /// Header format version
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Atoms in image order
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Append an atom
    pub fn push_atom(&mut self, atom: Atom) -> Result<()> {
        self.check_insert(&atom)?;
        self.atoms.push(atom);
        Ok(())
    }

    /// Insert an atom at `index`, shifting later atoms back
    ///
    /// # Panics
    /// Panics if `index > self.atoms().len()`, like [`Vec::insert`].
    pub fn insert_atom(&mut self, index: usize, atom: Atom) -> Result<()> {
        self.check_insert(&atom)?;
        self.atoms.insert(index, atom);
        Ok(())
    }

    /// Remove and return the atom at `index`
    pub fn remove_atom(&mut self, index: usize) -> Option<Atom> {
        (index < self.atoms.len()).then(|| self.atoms.remove(index))
    }

    /// Remove every atom of the given kind, returning how many were removed
    pub fn remove_kind(&mut self, kind: AtomType) -> usize {
        let before = self.atoms.len();
        self.atoms.retain(|atom| atom.kind() != kind);
        before - self.atoms.len()
    }

    fn check_insert(&self, atom: &Atom) -> Result<()> {
        atom.check_type()?;
        let kind = atom.kind();
        if kind.is_unique() && self.atoms.iter().any(|a| a.kind() == kind) {
            return Err(EepromError::DuplicateAtom(kind));
        }
        Ok(())
    }

    /// Vendor info atom
    pub fn vendor_info(&self) -> Result<&VendorInfo> {
        self.atoms
            .iter()
            .find_map(|atom| match atom {
                Atom::VendorInfo(info) => Some(info),
                _ => None,
            })
            .ok_or(EepromError::MissingAtom(AtomType::VendorInfo))
    }

    /// Mutable vendor info atom
    pub fn vendor_info_mut(&mut self) -> Result<&mut VendorInfo> {
        self.atoms
            .iter_mut()
            .find_map(|atom| match atom {
                Atom::VendorInfo(info) => Some(info),
                _ => None,
            })
            .ok_or(EepromError::MissingAtom(AtomType::VendorInfo))
    }

    /// Replace the vendor info atom in place, or append one
    pub fn set_vendor_info(&mut self, info: VendorInfo) {
        match self.vendor_info_mut() {
            Ok(existing) => *existing = info,
            Err(_) => self.atoms.push(Atom::VendorInfo(info)),
        }
    }

    /// GPIO map atom
    pub fn gpio_map(&self) -> Result<&GpioMap> {
        self.atoms
            .iter()
            .find_map(|atom| match atom {
                Atom::GpioMap(map) => Some(map),
                _ => None,
            })
            .ok_or(EepromError::MissingAtom(AtomType::GpioMap))
    }

    /// Mutable GPIO map atom
    pub fn gpio_map_mut(&mut self) -> Result<&mut GpioMap> {
        self.atoms
            .iter_mut()
            .find_map(|atom| match atom {
                Atom::GpioMap(map) => Some(map),
                _ => None,
            })
            .ok_or(EepromError::MissingAtom(AtomType::GpioMap))
    }

    /// Replace the GPIO map atom in place, or append one
    pub fn set_gpio_map(&mut self, map: GpioMap) {
        match self.gpio_map_mut() {
            Ok(existing) => *existing = map,
            Err(_) => self.atoms.push(Atom::GpioMap(map)),
        }
    }

    /// Device tree blob, if present
    pub fn device_tree(&self) -> Option<&[u8]> {
        self.atoms.iter().find_map(|atom| match atom {
            Atom::DeviceTree { data, .. } => Some(data.as_slice()),
            _ => None,
        })
    }

    // Identity projections

    /// Board UUID
    pub fn uuid(&self) -> Result<Guid> {
        Ok(self.vendor_info()?.uuid)
    }

    /// Set the board UUID
    pub fn set_uuid(&mut self, uuid: Guid) -> Result<()> {
        self.vendor_info_mut()?.uuid = uuid;
        Ok(())
    }

    /// Product ID
    pub fn product_id(&self) -> Result<u16> {
        Ok(self.vendor_info()?.product_id)
    }

    /// Set the product ID
    pub fn set_product_id(&mut self, product_id: u16) -> Result<()> {
        self.vendor_info_mut()?.product_id = product_id;
        Ok(())
    }

    /// Product version
    pub fn product_version(&self) -> Result<u16> {
        Ok(self.vendor_info()?.product_version)
    }

    /// Set the product version
    pub fn set_product_version(&mut self, product_version: u16) -> Result<()> {
        self.vendor_info_mut()?.product_version = product_version;
        Ok(())
    }

    /// Vendor label
    pub fn vendor(&self) -> Result<&[u8]> {
        Ok(&self.vendor_info()?.vendor)
    }

    /// Set the vendor label (checked against the 255-byte limit on encode)
    pub fn set_vendor(&mut self, vendor: impl Into<Vec<u8>>) -> Result<()> {
        self.vendor_info_mut()?.vendor = vendor.into();
        Ok(())
    }

    /// Product label
    pub fn product(&self) -> Result<&[u8]> {
        Ok(&self.vendor_info()?.product)
    }

    /// Set the product label (checked against the 255-byte limit on encode)
    pub fn set_product(&mut self, product: impl Into<Vec<u8>>) -> Result<()> {
        self.vendor_info_mut()?.product = product.into();
        Ok(())
    }

    // GPIO projections

    /// Bank settings
    pub fn bank(&self) -> Result<GpioBank> {
        Ok(self.gpio_map()?.bank)
    }

    /// Power settings
    pub fn power(&self) -> Result<GpioPower> {
        Ok(self.gpio_map()?.power)
    }

    /// Pin descriptors, indexed by GPIO number
    pub fn pins(&self) -> Result<&[GpioPin; GPIO_PIN_COUNT]> {
        Ok(&self.gpio_map()?.pins)
    }

    /// Mutable pin descriptors
    pub fn pins_mut(&mut self) -> Result<&mut [GpioPin; GPIO_PIN_COUNT]> {
        Ok(&mut self.gpio_map_mut()?.pins)
    }
}

/// Atoms worth reserving for a header count, given the bytes left
///
/// The header count is untrusted. Every atom takes at least a frame header
/// and a CRC, so the remaining bytes bound how many can really follow.
fn atom_capacity(atom_count: u16, remaining: usize) -> usize {
    usize::from(atom_count).min(remaining / (ATOM_HEADER_SIZE + CRC_SIZE))
}

/// Decode an image from raw bytes
pub fn decode(data: &[u8]) -> Result<Image> {
    Image::decode(data)
}

/// Encode an image to raw bytes
pub fn encode(image: &Image) -> Result<Vec<u8>> {
    image.encode()
}
