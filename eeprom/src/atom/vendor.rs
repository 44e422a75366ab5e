//! Vendor info atom payload
//!
//! Layout: uuid[16], product_id[2], product_ver[2], vlen[1], plen[1],
//! vendor[vlen], product[plen].

use alloc::vec::Vec;
use uguid::Guid;

use crate::error::{EepromError, Result};
use crate::utils::field::{len_u8, FieldReader, FieldWriter};

/// Board identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInfo {
    /// Board serial/UUID
    pub uuid: Guid,

    /// Product ID
    pub product_id: u16,

    /// Product version
    pub product_version: u16,

    /// Vendor label (raw bytes, not NUL-terminated)
    pub vendor: Vec<u8>,

    /// Product label (raw bytes, not NUL-terminated)
    pub product: Vec<u8>,
}

impl Default for VendorInfo {
    fn default() -> Self {
        Self {
            uuid: Guid::ZERO,
            product_id: 0,
            product_version: 0,
            vendor: Vec::new(),
            product: Vec::new(),
        }
    }
}

impl VendorInfo {
    /// Fixed part of the payload before the labels
    pub const FIXED_SIZE: usize = 22;

    /// Decode from an atom payload
    pub fn parse(data: &[u8], index: usize) -> Result<Self> {
        let mut r = FieldReader::new(data);
        let uuid = uuid_from_disk(r.array()?);
        let product_id = r.u16()?;
        let product_version = r.u16()?;
        let vlen = r.u8()? as usize;
        let plen = r.u8()? as usize;
        let vendor = r.bytes(vlen)?.to_vec();
        let product = r.bytes(plen)?.to_vec();

        if !r.is_empty() {
            return Err(EepromError::MalformedAtom { index });
        }

        Ok(Self {
            uuid,
            product_id,
            product_version,
            vendor,
            product,
        })
    }

    /// Encode as an atom payload
    pub fn write(&self, w: &mut FieldWriter) -> Result<()> {
        let vlen = len_u8("vendor", self.vendor.len())?;
        let plen = len_u8("product", self.product.len())?;

        w.put_bytes(&uuid_to_disk(self.uuid));
        w.put_u16(self.product_id);
        w.put_u16(self.product_version);
        w.put_u8(vlen);
        w.put_u8(plen);
        w.put_bytes(&self.vendor);
        w.put_bytes(&self.product);
        Ok(())
    }

    /// Payload size in bytes
    pub fn payload_len(&self) -> usize {
        Self::FIXED_SIZE + self.vendor.len() + self.product.len()
    }
}

// The UUID is stored as four little-endian 32-bit words, least
// significant first: the canonical big-endian byte order reversed.
fn uuid_from_disk(raw: [u8; 16]) -> Guid {
    let mut canonical = raw;
    canonical.reverse();
    Guid::from_bytes(swap_guid_fields(canonical))
}

fn uuid_to_disk(uuid: Guid) -> [u8; 16] {
    let mut raw = swap_guid_fields(uuid.to_bytes());
    raw.reverse();
    raw
}

/// Convert between canonical (RFC 4122) and GUID (mixed-endian) byte order
fn swap_guid_fields(b: [u8; 16]) -> [u8; 16] {
    [
        b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9], b[10], b[11], b[12], b[13],
        b[14], b[15],
    ]
}
