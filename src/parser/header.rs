use std::io::Read;

use log::debug;

use super::color_table::{read_color_table, ColorTable};
use super::error::{DecodeError, Result};
use super::source::ByteSource;

const SIGNATURE: &[u8] = b"GIF";
const APPLICATION_NETSCAPE: &[u8] = b"NETSCAPE2.0";

// introducer, label, block size, application identifier + authentication code
const NETSCAPE_PREFIX_LEN: usize = 3 + 11;
// prefix, sub-block size, sub-block id, loop count, terminator
const NETSCAPE_BLOCK_LEN: usize = NETSCAPE_PREFIX_LEN + 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V87a,
    V89a,
    Unknown([u8; 3]),
}

impl From<[u8; 3]> for Version {
    fn from(value: [u8; 3]) -> Self {
        match &value {
            b"87a" => Version::V87a,
            b"89a" => Version::V89a,
            _ => Version::Unknown(value),
        }
    }
}

/// Logical screen descriptor, global color table and loop count. Immutable
/// once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    pub width: u16,
    pub height: u16,
    pub global_color_table: Option<ColorTable>,
    /// Declared size, reported even when no global table is present.
    pub global_color_table_size: usize,
    pub color_resolution: u8,
    pub background_color_index: u8,
    pub pixel_aspect_ratio: u8,
    /// Animation repetitions, 0 meaning forever. 0 when the stream carries no
    /// Netscape extension.
    pub loop_count: u16,
}

impl Header {
    /// ARGB color the screen is cleared to.
    pub fn background_color(&self) -> u32 {
        self.global_color_table
            .as_ref()
            .map_or(0, |table| table.color(self.background_color_index))
    }

    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Checks the `GIF` magic and consumes the six byte signature block.
pub(crate) fn read_signature<R: Read>(source: &mut ByteSource<R>) -> Result<Version> {
    source.require(6)?;
    if !source.peek_range(0, SIGNATURE)? {
        return Err(DecodeError::InvalidSignature);
    }
    source.skip(3)?;

    let mut version = [0; 3];
    source.read_exact(&mut version)?;
    Ok(Version::from(version))
}

/// Reads the logical screen descriptor, the global color table and, when it
/// immediately follows, the Netscape looping extension.
pub(crate) fn read_screen<R: Read>(source: &mut ByteSource<R>, version: Version) -> Result<Header> {
    source.require(7)?;
    let width = source.read_u16()?;
    let height = source.read_u16()?;

    let packed_fields = source.read_u8()?;
    let global_color_table_flag = packed_fields & 0b10000000 != 0;
    let color_resolution = (packed_fields >> 4) & 0b00000111;
    let global_color_table_size = ColorTable::size_from_packed(packed_fields);

    let background_color_index = source.read_u8()?;
    let pixel_aspect_ratio = source.read_u8()?;

    let global_color_table = if global_color_table_flag {
        Some(read_color_table(source, global_color_table_size)?)
    } else {
        None
    };

    let loop_count = read_netscape_loop_count(source)?.unwrap_or(0);

    let header = Header {
        version,
        width,
        height,
        global_color_table,
        global_color_table_size,
        color_resolution,
        background_color_index,
        pixel_aspect_ratio,
        loop_count,
    };
    debug!(
        "processed logical screen {}x{}, version {:?}, global table: {}, loop count {}",
        width, height, version, global_color_table_flag, loop_count
    );
    Ok(header)
}

/// Consumes a Netscape application extension if one is next in the stream.
/// Anything else is left untouched for the body parser.
fn read_netscape_loop_count<R: Read>(source: &mut ByteSource<R>) -> Result<Option<u16>> {
    if !source.request(NETSCAPE_BLOCK_LEN)? {
        return Ok(None);
    }

    let prefix = source.peek(NETSCAPE_PREFIX_LEN)?;
    if prefix[0] != 0x21 || prefix[1] != 0xff || &prefix[3..] != APPLICATION_NETSCAPE {
        return Ok(None);
    }
    source.skip(NETSCAPE_PREFIX_LEN)?;

    //     +===============+
    // 14  |     0x03      |  Sub-block Data Size
    //     +---------------+
    // 15  |     0x01      |  Sub-block ID
    //     +---------------+
    // 16  |               |
    //     +-             -+  Loop Count (2 bytes)
    // 17  |               |
    //     +===============+
    // 18  |     0x00      |  Block Terminator
    //     +---------------+
    let block_size = usize::from(source.read_u8()?);
    if block_size < 3 {
        source.skip(block_size)?;
        source.skip_sub_blocks()?;
        return Ok(None);
    }

    source.skip(1)?;
    let loop_count = source.read_u16()?;
    source.skip(block_size - 3)?;
    source.skip_sub_blocks()?;

    debug!("processed netscape extension, loop count {}", loop_count);
    Ok(Some(loop_count))
}
