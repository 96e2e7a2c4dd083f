use std::io::Read;

use log::{debug, warn};

use super::color_table::{read_color_table, ColorTable};
use super::error::Result;
use super::header::Header;
use super::lzw::LzwStatus;
use super::source::ByteSource;
use super::DisposalMethod;

// GIF viewers treat tiny delays as "as fast as possible" and slow them down.
const MIN_DELAY_MS: u32 = 10;
const DEFAULT_DELAY_MS: u32 = 100;

/// Delay in milliseconds for a raw delay in hundredths of a second.
pub fn delay_ms(raw: u16) -> u32 {
    match u32::from(raw) * 10 {
        delay if delay <= MIN_DELAY_MS => DEFAULT_DELAY_MS,
        delay => delay,
    }
}

/// Graphics Control Extension, applying to the image that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    pub disposal: DisposalMethod,
    pub user_input: bool,
    pub delay_ms: u32,
    pub transparent_index: Option<u8>,
}

impl Default for GraphicControl {
    fn default() -> Self {
        Self {
            disposal: DisposalMethod::Unknown,
            user_input: false,
            delay_ms: delay_ms(0),
            transparent_index: None,
        }
    }
}

impl GraphicControl {
    /// Reads the extension body, the `0x21 0xf9` introducer already consumed.
    pub fn read<R: Read>(source: &mut ByteSource<R>) -> Result<Self> {
        let block_size = usize::from(source.read_u8()?);
        if block_size != 4 {
            warn!("graphic control extension with block size {}", block_size);
        }
        source.require(4)?;

        // packed fields definition
        // XXXYYYZW
        // XXX = reserved, not needed
        // YYY = disposal method, indicates what to do with graphic after displaying
        // Z = user input flag
        // W = transparent color flag
        let packed_fields = source.read_u8()?;
        let disposal = DisposalMethod::from_u8((packed_fields >> 2) & 0b00000111);
        let user_input = packed_fields & 0b00000010 != 0;
        let transparent_color_flag = packed_fields & 0b00000001 != 0;

        let delay_ms = delay_ms(source.read_u16()?);
        // always present, even when the flag is off
        let transparent_color_index = source.read_u8()?;

        source.skip(block_size.saturating_sub(4))?;
        source.skip_sub_blocks()?;

        let extension = Self {
            disposal,
            user_input,
            delay_ms,
            transparent_index: transparent_color_flag.then_some(transparent_color_index),
        };
        debug!("processed graphic control extension: {:?}", extension);
        Ok(extension)
    }
}

/// Image Descriptor plus the local color table that may follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub interlaced: bool,
    pub sorted: bool,
    /// Declared size, reported even when no local table is present.
    pub local_color_table_size: usize,
    pub local_color_table: Option<ColorTable>,
}

impl ImageDescriptor {
    /// Reads the descriptor, the `0x2c` separator already consumed.
    pub fn read<R: Read>(source: &mut ByteSource<R>) -> Result<Self> {
        source.require(9)?;

        let left = source.read_u16()?;
        let top = source.read_u16()?;
        let width = source.read_u16()?;
        let height = source.read_u16()?;

        let packed_fields = source.read_u8()?;
        let local_color_table_flag = packed_fields & 0b10000000 != 0;
        let interlaced = packed_fields & 0b01000000 != 0;
        let sorted = packed_fields & 0b00100000 != 0;
        let local_color_table_size = ColorTable::size_from_packed(packed_fields);

        let local_color_table = if local_color_table_flag {
            Some(read_color_table(source, local_color_table_size)?)
        } else {
            None
        };

        let descriptor = Self {
            left,
            top,
            width,
            height,
            interlaced,
            sorted,
            local_color_table_size,
            local_color_table,
        };
        debug!(
            "processed image descriptor {}x{} at ({}, {}), interlaced: {}, local table: {}",
            width,
            height,
            left,
            top,
            interlaced,
            local_color_table_flag
        );
        Ok(descriptor)
    }

    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// One decoded animation frame, composited onto the full logical screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub delay_ms: u32,
    pub disposal: DisposalMethod,
    pub user_input: bool,
    pub transparent_index: Option<u8>,

    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub interlaced: bool,
    pub sorted: bool,
    pub local_color_table_size: usize,
    pub local_color_table: Option<ColorTable>,

    /// Color indices of the frame rectangle, in stream order (pass order for
    /// interlaced frames).
    pub indices: Box<[u8]>,
    /// ARGB8888 pixels of the whole logical screen, row-major, bytes in
    /// A, R, G, B order.
    pub pixels: Box<[u8]>,
    /// How the image data ended. Anything but `Complete` means `indices`
    /// was padded with zeros.
    pub data_status: LzwStatus,
}

impl Frame {
    pub(crate) fn new(
        control: GraphicControl,
        descriptor: ImageDescriptor,
        indices: Box<[u8]>,
        pixels: Box<[u8]>,
        data_status: LzwStatus,
    ) -> Self {
        Self {
            delay_ms: control.delay_ms,
            disposal: control.disposal,
            user_input: control.user_input,
            transparent_index: control.transparent_index,
            left: descriptor.left,
            top: descriptor.top,
            width: descriptor.width,
            height: descriptor.height,
            interlaced: descriptor.interlaced,
            sorted: descriptor.sorted,
            local_color_table_size: descriptor.local_color_table_size,
            local_color_table: descriptor.local_color_table,
            indices,
            pixels,
            data_status,
        }
    }

    /// The local table if the frame has one, the global table otherwise.
    pub fn active_color_table<'a>(&'a self, header: &'a Header) -> Option<&'a ColorTable> {
        self.local_color_table
            .as_ref()
            .or(header.global_color_table.as_ref())
    }

    /// ARGB value of the screen pixel at (`x`, `y`).
    pub fn pixel(&self, screen_width: u16, x: u16, y: u16) -> Option<u32> {
        let offset = (usize::from(y) * usize::from(screen_width) + usize::from(x)) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
