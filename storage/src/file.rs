//! EEPROM images bound to a byte store
//!
//! [`EepromFile`] keeps a decoded [`Image`] together with the store it
//! came from. Loading on open and saving on close are opt-in through
//! [`OpenOptions`]; nothing is ever written from `Drop`.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};
use std::path::Path;

use hat_eeprom::Image;
use log::info;

use crate::error::{Result, StorageError};
use crate::store::ByteStore;

/// Load/save policy for an [`EepromFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Decode the store contents on open (otherwise start empty)
    pub autoload: bool,
    /// Save on [`EepromFile::close`] and at the end of a successful scope
    pub autosave: bool,
    /// Open without write access; saving fails with [`StorageError::ReadOnly`]
    pub read_only: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            autoload: true,
            autosave: false,
            read_only: false,
        }
    }
}

/// An image and the store it is saved to
pub struct EepromFile<S: ByteStore = File> {
    image: Image,
    store: S,
    options: OpenOptions,
}

impl EepromFile<File> {
    /// Open an image file
    pub fn open(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::OpenOptions::new()
            .read(true)
            .write(!options.read_only)
            .open(path)?;
        info!("opened EEPROM image {}", path.display());
        Self::from_store(file, options)
    }

    /// Open an image file, run `f` on it, then close it
    ///
    /// The file is released on every exit path. It is saved only when
    /// `autosave` is set and `f` succeeded.
    pub fn scoped<T, F>(path: impl AsRef<Path>, options: OpenOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut eeprom = Self::open(path, options)?;
        let value = f(&mut eeprom)?;
        eeprom.close()?;
        Ok(value)
    }
}

impl<S: ByteStore> EepromFile<S> {
    /// Bind to an already open store
    pub fn from_store(mut store: S, options: OpenOptions) -> Result<Self> {
        let image = if options.autoload {
            let data = store.read_image()?;
            hat_eeprom::decode(&data)?
        } else {
            Image::new()
        };
        Ok(Self {
            image,
            store,
            options,
        })
    }

    /// Bind an existing image to a store without reading it
    pub fn with_image(store: S, image: Image, options: OpenOptions) -> Self {
        Self {
            image,
            store,
            options,
        }
    }

    /// Policy this file was opened with
    pub fn options(&self) -> OpenOptions {
        self.options
    }

    /// The image
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// The image, mutably
    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.image
    }

    /// Discard in-memory changes and decode the store again
    pub fn load(&mut self) -> Result<()> {
        let data = self.store.read_image()?;
        self.image = hat_eeprom::decode(&data)?;
        Ok(())
    }

    /// Encode the image and write it back to the store
    pub fn save(&mut self) -> Result<()> {
        if self.options.read_only {
            return Err(StorageError::ReadOnly);
        }
        let data = self.image.encode()?;
        self.store.write_image(&data)?;
        info!("saved {} byte image to {}", data.len(), self.store.name());
        Ok(())
    }

    /// Write the image to another file, leaving the store untouched
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        save_path(&self.image, path)
    }

    /// Write the image to a writer, leaving the store untouched
    pub fn save_to_writer(&self, mut writer: impl Write) -> Result<()> {
        writer.write_all(&self.image.encode()?)?;
        writer.flush()?;
        Ok(())
    }

    /// Save if `autosave` is set, then release the store
    pub fn close(mut self) -> Result<()> {
        if self.options.autosave {
            self.save()?;
        }
        Ok(())
    }

    /// Release the store without saving
    pub fn into_parts(self) -> (Image, S) {
        (self.image, self.store)
    }
}

impl<S: ByteStore> Deref for EepromFile<S> {
    type Target = Image;

    fn deref(&self) -> &Image {
        &self.image
    }
}

impl<S: ByteStore> DerefMut for EepromFile<S> {
    fn deref_mut(&mut self) -> &mut Image {
        &mut self.image
    }
}

/// Load an image from a file
pub fn load_path(path: impl AsRef<Path>) -> Result<Image> {
    let data = fs::read(path)?;
    Ok(hat_eeprom::decode(&data)?)
}

/// Load an image from an open reader, from its current position
pub fn load_reader(mut reader: impl Read) -> Result<Image> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(hat_eeprom::decode(&data)?)
}

/// Save an image to a file, replacing its contents
pub fn save_path(image: &Image, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, image.encode()?)?;
    Ok(())
}
