//! Error types for storage operations

use std::fmt;
use std::io;
use std::path::PathBuf;

use hat_eeprom::EepromError;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while loading or saving an image
#[derive(Debug)]
pub enum StorageError {
    /// I/O error on the backing store
    Io(io::Error),

    /// Image failed to decode or encode
    Eeprom(EepromError),

    /// EEPROM device node did not appear in time
    DeviceTimeout {
        /// Node that was waited for
        path: PathBuf,
    },

    /// Save attempted on a file opened read-only
    ReadOnly,
}

impl StorageError {
    /// The codec error, if this is one
    pub fn eeprom_kind(&self) -> Option<&EepromError> {
        match self {
            Self::Eeprom(err) => Some(err),
            _ => None,
        }
    }

    /// True if this is an I/O "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Eeprom(err) => write!(f, "{}", err),
            Self::DeviceTimeout { path } => {
                write!(f, "EEPROM device {} did not appear", path.display())
            }
            Self::ReadOnly => write!(f, "EEPROM file is read-only"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Eeprom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<EepromError> for StorageError {
    fn from(err: EepromError) -> Self {
        Self::Eeprom(err)
    }
}
