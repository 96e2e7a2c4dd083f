use std::io::Read;

use log::debug;

use super::error::Result;
use super::source::ByteSource;

/// A palette of opaque ARGB colors, `0xAARRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable(Box<[u32]>);

impl ColorTable {
    /// Table size encoded by the 3-bit size field of a packed byte.
    pub fn size_from_packed(packed: u8) -> usize {
        2 << (packed & 0b00000111)
    }

    /// Color for `index`, or transparent black when the index lies past the
    /// end of the table.
    pub fn color(&self, index: u8) -> u32 {
        self.0.get(usize::from(index)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for ColorTable {
    fn from(colors: Vec<u32>) -> Self {
        Self(colors.into_boxed_slice())
    }
}

/// Reads `count` RGB triplets into an opaque ARGB table.
pub fn read_color_table<R: Read>(source: &mut ByteSource<R>, count: usize) -> Result<ColorTable> {
    let mut rgb = vec![0; count * 3];
    source.read_exact(&mut rgb)?;

    let colors: Vec<u32> = rgb
        .chunks_exact(3)
        .map(|c| 0xff000000 | u32::from(c[0]) << 16 | u32::from(c[1]) << 8 | u32::from(c[2]))
        .collect();

    let table = ColorTable::from(colors);
    debug!("read color table with {} entries", table.len());
    Ok(table)
}
