use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MSG_NUMBER: u8 = 0x10;
pub const DEFAULT_MSG_ID: u16 = 0x0102;
pub const DEFAULT_KEYS: [u8; 4] = [0x31, 0x41, 0x59, 0x26];
pub const DEFAULT_SECTION_ADDRESS: u16 = 0x9000;

/**
 * Build-time constants for the upgrade-message header. Loaded from TOML,
 * every field is optional and falls back to the AFD2 defaults:
 *
 * ```toml
 * msg_number = 0x10
 * msg_id = 0x0102
 * keys = [0x31, 0x41, 0x59, 0x26]
 * section_address = 0x9000
 * number_of_sections = 1
 * ```
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageConfig {
    pub msg_number: u8,
    /// Sent most significant byte first.
    pub msg_id: u16,
    pub keys: [u8; 4],
    /// When set, must match the number of sections actually built.
    pub number_of_sections: Option<u8>,
    pub section_address: u16,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            msg_number: DEFAULT_MSG_NUMBER,
            msg_id: DEFAULT_MSG_ID,
            keys: DEFAULT_KEYS,
            number_of_sections: None,
            section_address: DEFAULT_SECTION_ADDRESS,
        }
    }
}

impl MessageConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&text, path)
    }
}
