use log::debug;

use super::image::RomImage;
use crate::error::{Error, Result};

/// Largest payload a 16-bit section length can describe.
pub const MAX_SECTION_LENGTH: usize = 0xFFFF;

/// Most sections an 8-bit section count can describe.
pub const MAX_SECTIONS: usize = 0xFF;

/**
 * How a `RomImage` is cut into upgrade-message sections.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionLayout {
    /// The whole image as one section, flashed at `address`.
    Single { address: u16 },
    /// One section per address region of the image.
    Regions,
}

/**
 * Payload of one section, before it is framed with a section header.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionData {
    address: u16,
    data: Vec<u8>,
}

impl SectionData {
    pub fn new(section: usize, address: u32, data: Vec<u8>) -> Result<Self> {
        let address = u16::try_from(address)
            .map_err(|_| Error::AddressOutOfRange { section, address })?;
        if data.len() > MAX_SECTION_LENGTH {
            return Err(Error::SectionTooLarge {
                section,
                length: data.len(),
            });
        }
        Ok(Self { address, data })
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/**
 * Split `image` into section payloads. Oversized sections and addresses above
 * 16 bits are rejected rather than truncated.
 */
pub fn split_sections(image: &RomImage, layout: SectionLayout) -> Result<Vec<SectionData>> {
    let sections = match layout {
        SectionLayout::Single { address } => {
            vec![SectionData::new(0, address as u32, image.data().to_vec())?]
        }
        SectionLayout::Regions => {
            let mut sections = Vec::new();
            for (i, r) in image.regions().enumerate() {
                sections.push(SectionData::new(
                    i,
                    r.address(),
                    image.region_data(r).to_vec(),
                )?);
            }
            sections
        }
    };

    if sections.is_empty() {
        return Err(Error::NoSections);
    }
    if sections.len() > MAX_SECTIONS {
        return Err(Error::TooManySections {
            count: sections.len(),
        });
    }
    for (i, s) in sections.iter().enumerate() {
        debug!(
            "section {}: ADDR = 0x{:04X}, SIZE = {}",
            i,
            s.address(),
            s.len()
        );
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_region_image() -> RomImage {
        let mut image = RomImage::new();
        image.start_region(0x9000);
        image.extend_from_slice(&[1, 2, 3]);
        image.start_region(0xfffe);
        image.extend_from_slice(&[0x00, 0x90]);
        image
    }

    #[test]
    fn single_layout_spans_whole_image() {
        let image = two_region_image();
        let sections = split_sections(&image, SectionLayout::Single { address: 0x9000 }).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].address(), 0x9000);
        assert_eq!(sections[0].data(), &[1, 2, 3, 0x00, 0x90]);
    }

    #[test]
    fn single_layout_keeps_empty_image() {
        let sections =
            split_sections(&RomImage::new(), SectionLayout::Single { address: 0x9000 }).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_empty());
    }

    #[test]
    fn region_layout_follows_directives() {
        let image = two_region_image();
        let sections = split_sections(&image, SectionLayout::Regions).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].address(), 0xfffe);
        assert_eq!(sections[1].data(), &[0x00, 0x90]);
    }

    #[test]
    fn region_layout_of_empty_image_is_rejected() {
        let result = split_sections(&RomImage::new(), SectionLayout::Regions);
        assert!(matches!(result, Err(Error::NoSections)));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let image = RomImage::from(vec![0xff; MAX_SECTION_LENGTH + 1]);
        let result = split_sections(&image, SectionLayout::Single { address: 0x9000 });
        assert!(matches!(
            result,
            Err(Error::SectionTooLarge {
                section: 0,
                length: 0x10000
            })
        ));

        let image = RomImage::from(vec![0xff; MAX_SECTION_LENGTH]);
        assert!(split_sections(&image, SectionLayout::Single { address: 0 }).is_ok());
    }

    #[test]
    fn wide_region_address_is_rejected() {
        let mut image = RomImage::new();
        image.start_region(0x1_0000);
        image.extend_from_slice(&[0xaa]);
        let result = split_sections(&image, SectionLayout::Regions);
        assert!(matches!(
            result,
            Err(Error::AddressOutOfRange {
                section: 0,
                address: 0x1_0000
            })
        ));
    }
}
