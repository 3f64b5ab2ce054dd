use super::crc::{crc16, device_crc16};
use super::section::SectionData;
use crate::config::MessageConfig;
use crate::error::{Error, Result};

pub const MSG_HEADER_LEN: usize = 8;
pub const SECTION_HEADER_LEN: usize = 8;

/// First byte of every section header.
pub const SECTION_START: u8 = 0xA5;

/**
 * Upgrade message header: message number, message ID, upgrade keys and the
 * section count. 8 bytes on the wire.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub msg_number: u8,
    pub msg_id_msb: u8,
    pub msg_id_lsb: u8,
    pub keys: [u8; 4],
    pub number_of_sections: u8,
}

impl MessageHeader {
    pub fn to_bytes(&self) -> [u8; MSG_HEADER_LEN] {
        let [k0, k1, k2, k3] = self.keys;
        [
            self.msg_number,
            self.msg_id_msb,
            self.msg_id_lsb,
            k0,
            k1,
            k2,
            k3,
            self.number_of_sections,
        ]
    }

    pub fn from_bytes(b: &[u8; MSG_HEADER_LEN]) -> Self {
        Self {
            msg_number: b[0],
            msg_id_msb: b[1],
            msg_id_lsb: b[2],
            keys: [b[3], b[4], b[5], b[6]],
            number_of_sections: b[7],
        }
    }
}

/**
 * Describes one contiguous section of flash. 8 bytes on the wire, all 16-bit
 * fields big-endian, preceded by `SECTION_START`.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub section_number: u8,
    pub start_address: u16,
    pub length: u16,
    pub crc16: u16,
}

impl SectionHeader {
    pub fn to_bytes(&self) -> [u8; SECTION_HEADER_LEN] {
        let [a_hi, a_lo] = self.start_address.to_be_bytes();
        let [l_hi, l_lo] = self.length.to_be_bytes();
        let [c_hi, c_lo] = self.crc16.to_be_bytes();
        [
            SECTION_START,
            self.section_number,
            a_hi,
            a_lo,
            l_hi,
            l_lo,
            c_hi,
            c_lo,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    header: SectionHeader,
    payload: Vec<u8>,
}

impl Section {
    pub(crate) fn new(header: SectionHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> &SectionHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/**
 * Complete upgrade message: header, then each section header followed by its
 * payload.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeMessage {
    header: MessageHeader,
    sections: Vec<Section>,
}

impl UpgradeMessage {
    /**
     * Frame `sections` with the header constants from `config`. Sections are
     * numbered from 0 and each gets the CRC16 of its own payload.
     */
    pub fn build(sections: Vec<SectionData>, config: &MessageConfig) -> Result<Self> {
        let actual = sections.len();
        if actual == 0 {
            return Err(Error::NoSections);
        }
        let number_of_sections = match config.number_of_sections {
            Some(n) if n as usize == actual => n,
            Some(n) => {
                return Err(Error::SectionCountMismatch {
                    configured: n,
                    actual,
                })
            }
            None => u8::try_from(actual).map_err(|_| Error::TooManySections { count: actual })?,
        };

        let [msg_id_msb, msg_id_lsb] = config.msg_id.to_be_bytes();
        let header = MessageHeader {
            msg_number: config.msg_number,
            msg_id_msb,
            msg_id_lsb,
            keys: config.keys,
            number_of_sections,
        };

        let mut framed = Vec::with_capacity(actual);
        for (i, s) in sections.into_iter().enumerate() {
            let length = u16::try_from(s.len()).map_err(|_| Error::SectionTooLarge {
                section: i,
                length: s.len(),
            })?;
            let header = SectionHeader {
                section_number: i as u8,
                start_address: s.address(),
                length,
                crc16: crc16(s.data()),
            };
            framed.push(Section::new(header, s.into_data()));
        }

        Ok(Self {
            header,
            sections: framed,
        })
    }

    pub(crate) fn from_parts(header: MessageHeader, sections: Vec<Section>) -> Self {
        Self { header, sections }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Serialized length in bytes.
    pub fn len(&self) -> usize {
        self.sections
            .iter()
            .fold(MSG_HEADER_LEN, |n, s| n + SECTION_HEADER_LEN + s.payload.len())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        for s in self.sections.iter() {
            bytes.extend_from_slice(&s.header.to_bytes());
            bytes.extend_from_slice(&s.payload);
        }
        bytes
    }

    /// Check every section's CRC16 with the device's own routine.
    pub fn verify(&self) -> Result<()> {
        for (i, s) in self.sections.iter().enumerate() {
            let actual = device_crc16(&s.payload);
            if actual != s.header.crc16 {
                return Err(Error::CrcMismatch {
                    section: i,
                    expected: s.header.crc16,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// The device refuses an upgrade whose keys don't match its own.
    pub fn check_keys(&self, config: &MessageConfig) -> Result<()> {
        if self.header.keys != config.keys {
            return Err(Error::KeyMismatch {
                expected: config.keys,
                found: self.header.keys,
            });
        }
        Ok(())
    }
}

//----------------------------------------------------------------------------
// Tests
//----------------------------------------------------------------------------
