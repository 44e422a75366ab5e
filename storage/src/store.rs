//! Byte store backends
//!
//! A store holds exactly one encoded image. Reads always start from the
//! beginning; writes replace the previous contents.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use log::debug;

/// Trait for image storage backends
pub trait ByteStore {
    /// Read the whole store
    fn read_image(&mut self) -> io::Result<Vec<u8>>;

    /// Replace the store contents with `data`
    fn write_image(&mut self, data: &[u8]) -> io::Result<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    fn read_image(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_image()
    }

    fn write_image(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_image(data)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// Regular files and sysfs EEPROM nodes. Device nodes may refuse to seek
// or truncate; those failures are not fatal.
impl ByteStore for File {
    fn read_image(&mut self) -> io::Result<Vec<u8>> {
        if let Err(err) = self.seek(SeekFrom::Start(0)) {
            debug!("rewind before read failed: {}", err);
        }
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        Ok(data)
    }

    fn write_image(&mut self, data: &[u8]) -> io::Result<()> {
        if let Err(err) = self.seek(SeekFrom::Start(0)) {
            debug!("rewind before write failed: {}", err);
        }
        if let Err(err) = self.set_len(0) {
            debug!("truncate before write failed: {}", err);
        }
        self.write_all(data)?;
        self.flush()
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl ByteStore for Cursor<Vec<u8>> {
    fn read_image(&mut self) -> io::Result<Vec<u8>> {
        self.set_position(0);
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        Ok(data)
    }

    fn write_image(&mut self, data: &[u8]) -> io::Result<()> {
        self.get_mut().clear();
        self.set_position(0);
        self.write_all(data)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
