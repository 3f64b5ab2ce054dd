/**
 * A run of contiguous bytes within a `RomImage`, starting at a device
 * address taken from the dump's address directives.
 */
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Region {
    base: u32,
    offset: usize,
    len: usize,
}

impl Region {
    pub fn address(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/**
 * Flat byte image of a ROM dump, in file order.
 *
 * Region boundaries are recorded alongside, but never add or drop bytes: the
 * regions, concatenated, are exactly `data()`.
 */
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RomImage {
    data: Vec<u8>,
    regions: Vec<Region>,
}

impl RomImage {
    pub fn new() -> Self {
        Self::default()
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

    /// Non-empty regions, in file order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| !r.is_empty())
    }

    pub fn region_data(&self, region: &Region) -> &[u8] {
        &self.data[region.offset..region.offset + region.len]
    }

    /// Start a new region at `base`. An empty current region is just moved.
    pub fn start_region(&mut self, base: u32) {
        match self.regions.last_mut() {
            Some(last) if last.is_empty() => last.base = base,
            _ => self.regions.push(Region {
                base,
                offset: self.data.len(),
                len: 0,
            }),
        }
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        if self.regions.is_empty() {
            self.start_region(0);
        }
        if let Some(last) = self.regions.last_mut() {
            last.len += bytes.len();
        }
        self.data.extend_from_slice(bytes);
    }
}

impl From<Vec<u8>> for RomImage {
    fn from(data: Vec<u8>) -> Self {
        let mut image = RomImage::new();
        image.extend_from_slice(&data);
        image
    }
}
