use std::path::Path;

use ihex::Record;
use log::{debug, trace};

use super::image::RomImage;
use crate::error::{Error, Result};

/**
 * Read an Intel HEX image into a `RomImage`, keeping data records in file
 * order. A data record that doesn't continue the previous one starts a new
 * region at its absolute address.
 */
pub fn read_intel_hex(text: &str) -> Result<RomImage> {
    let reader = ihex::Reader::new_with_options(
        text,
        ihex::ReaderOptions {
            stop_after_first_error: true,
            stop_after_eof: true,
        },
    );

    let mut image = RomImage::new();
    let mut segment: u32 = 0;
    let mut pointer: Option<u32> = None;

    for (index, record) in reader.enumerate() {
        let record = record.map_err(|e| Error::IntelHex {
            index,
            reason: e.to_string(),
        })?;

        match record {
            Record::Data { offset, value } => {
                // Type: 0x00
                let address = segment + offset as u32;
                if value.is_empty() {
                    continue;
                }
                if pointer != Some(address) {
                    debug!("record {}: region at 0x{:08X}", index, address);
                    image.start_region(address);
                }
                trace!("record {}: {} byte(s)", index, value.len());
                image.extend_from_slice(&value);
                pointer = Some(address.wrapping_add(value.len() as u32));
            }
            Record::EndOfFile => {
                // Type: 0x01
                break;
            }
            Record::ExtendedSegmentAddress(base) => {
                // Type: 0x02
                segment = (base as u32) << 4;
            }
            Record::ExtendedLinearAddress(base) => {
                // Type: 0x04
                segment = (base as u32) << 16;
            }
            Record::StartSegmentAddress { .. } | Record::StartLinearAddress(_) => {
                // Types 0x03 and 0x05 (entry points, not image data)
            }
        }
    }
    Ok(image)
}

pub fn read_intel_hex_file(path: &Path) -> Result<RomImage> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    read_intel_hex(&text)
}

//----------------------------------------------------------------------------
// Tests
//----------------------------------------------------------------------------
