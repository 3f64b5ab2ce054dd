use std::path::PathBuf;

use thiserror::Error;

/**
 * Everything that can go wrong while building, decoding, or writing an
 * upgrade message.
 */
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Intel HEX record {index} is invalid: {reason}")]
    IntelHex { index: usize, reason: String },

    #[error("Section {section} is {length} bytes long, the limit is 65535 bytes")]
    SectionTooLarge { section: usize, length: usize },

    #[error("Section {section} starts at 0x{address:X}, which is not a 16-bit address")]
    AddressOutOfRange { section: usize, address: u32 },

    #[error("{count} sections do not fit the 8-bit section count")]
    TooManySections { count: usize },

    #[error("The image contains no data, so no section could be built")]
    NoSections,

    #[error("Configured for {configured} section(s), but {actual} were built")]
    SectionCountMismatch { configured: u8, actual: usize },

    #[error("Message truncated: expected {expected} byte(s) for the {what}, found {found}")]
    Truncated {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Section {section}: start marker is 0x{found:02X}, expected 0xA5")]
    BadStartMarker { section: usize, found: u8 },

    #[error("Section {section}: section number {found} is out of sequence")]
    BadSectionNumber { section: usize, found: u8 },

    #[error("{count} trailing byte(s) after the last section")]
    TrailingBytes { count: usize },

    #[error("Section {section}: CRC16 is 0x{actual:04X}, the header says 0x{expected:04X}")]
    CrcMismatch {
        section: usize,
        expected: u16,
        actual: u16,
    },

    #[error("Upgrade keys {found:02X?} do not match the expected keys {expected:02X?}")]
    KeyMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error("Invalid configuration file '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
