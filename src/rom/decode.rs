use super::message::{
    MessageHeader, Section, SectionHeader, UpgradeMessage, MSG_HEADER_LEN, SECTION_HEADER_LEN,
    SECTION_START,
};
use super::titxt::hex_pairs;
use crate::error::{Error, Result};

fn take<'a>(bytes: &mut &'a [u8], n: usize, what: &'static str) -> Result<&'a [u8]> {
    if bytes.len() < n {
        return Err(Error::Truncated {
            what,
            expected: n,
            found: bytes.len(),
        });
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Ok(head)
}

/**
 * Parse a binary upgrade message, reading section headers the same way the
 * device does. CRCs are not checked here, see `UpgradeMessage::verify`.
 */
pub fn decode_bytes(mut bytes: &[u8]) -> Result<UpgradeMessage> {
    let mut head = [0u8; MSG_HEADER_LEN];
    head.copy_from_slice(take(&mut bytes, MSG_HEADER_LEN, "message header")?);
    let header = MessageHeader::from_bytes(&head);

    let mut sections = Vec::with_capacity(header.number_of_sections as usize);
    for i in 0..header.number_of_sections as usize {
        let sh = take(&mut bytes, SECTION_HEADER_LEN, "section header")?;
        if sh[0] != SECTION_START {
            return Err(Error::BadStartMarker {
                section: i,
                found: sh[0],
            });
        }
        if sh[1] as usize != i {
            return Err(Error::BadSectionNumber {
                section: i,
                found: sh[1],
            });
        }
        let section = SectionHeader {
            section_number: sh[1],
            start_address: u16::from_be_bytes([sh[2], sh[3]]),
            length: u16::from_be_bytes([sh[4], sh[5]]),
            crc16: u16::from_be_bytes([sh[6], sh[7]]),
        };
        let payload = take(&mut bytes, section.length as usize, "section payload")?;
        sections.push(Section::new(section, payload.to_vec()));
    }

    if !bytes.is_empty() {
        return Err(Error::TrailingBytes { count: bytes.len() });
    }
    Ok(UpgradeMessage::from_parts(header, sections))
}

/// Parse the text form of a message (hex pairs, any separators).
pub fn decode_text(text: &str) -> Result<UpgradeMessage> {
    let bytes: Vec<u8> = text.lines().flat_map(hex_pairs).collect();
    decode_bytes(&bytes)
}

//----------------------------------------------------------------------------
// Tests
//----------------------------------------------------------------------------
