pub mod crc;
pub mod decode;
pub mod image;
pub mod intel;
pub mod merge;
pub mod message;
pub mod section;
pub mod text;
pub mod titxt;

pub use image::RomImage;
pub use message::UpgradeMessage;
pub use section::{split_sections, SectionLayout};
