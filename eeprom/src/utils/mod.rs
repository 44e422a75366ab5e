//! Utility functions
//!
//! Checksums and little-endian field access shared by the atom and
//! descriptor codecs.

pub mod checksum;
pub mod field;

pub use checksum::{checksum, verify_checksum};
pub use field::{FieldReader, FieldWriter};
