//! In-memory GIF assembly for the integration tests.

#![allow(dead_code)]

pub const BLACK: [u8; 3] = [0x00, 0x00, 0x00];
pub const RED: [u8; 3] = [0xff, 0x00, 0x00];
pub const GREEN: [u8; 3] = [0x00, 0xff, 0x00];
pub const BLUE: [u8; 3] = [0x00, 0x00, 0xff];
pub const TEAL: [u8; 3] = [0x0a, 0x14, 0x1e];

/// ARGB value the decoder produces for an RGB palette entry.
pub fn argb(rgb: [u8; 3]) -> u32 {
    0xff000000 | u32::from(rgb[0]) << 16 | u32::from(rgb[1]) << 8 | u32::from(rgb[2])
}

/// Screen pixels of a decoded frame as ARGB words.
pub fn screen(pixels: &[u8]) -> Vec<u32> {
    pixels
        .chunks_exact(4)
        .map(|p| u32::from_be_bytes([p[0], p[1], p[2], p[3]]))
        .collect()
}

pub struct FrameSpec {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// `None` writes no graphic control extension at all.
    pub control: Option<Control>,
    pub interlaced: bool,
    pub local_table: Option<Vec<[u8; 3]>>,
    /// Row-major indices in display order.
    pub indices: Vec<u8>,
    /// Keep only this many bytes of the compressed data.
    pub truncate_lzw: Option<usize>,
}

#[derive(Clone, Copy, Default)]
pub struct Control {
    pub disposal: u8,
    pub delay: u16,
    pub transparent: Option<u8>,
}

impl FrameSpec {
    pub fn new(width: u16, height: u16, indices: Vec<u8>) -> Self {
        assert_eq!(indices.len(), usize::from(width) * usize::from(height));
        Self {
            left: 0,
            top: 0,
            width,
            height,
            control: Some(Control::default()),
            interlaced: false,
            local_table: None,
            indices,
            truncate_lzw: None,
        }
    }

    pub fn at(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn disposal(mut self, disposal: u8) -> Self {
        self.control.get_or_insert_with(Control::default).disposal = disposal;
        self
    }

    pub fn delay(mut self, delay: u16) -> Self {
        self.control.get_or_insert_with(Control::default).delay = delay;
        self
    }

    pub fn transparent(mut self, index: u8) -> Self {
        self.control.get_or_insert_with(Control::default).transparent = Some(index);
        self
    }

    pub fn without_control(mut self) -> Self {
        self.control = None;
        self
    }

    pub fn interlaced(mut self) -> Self {
        self.interlaced = true;
        self
    }

    pub fn local_table(mut self, table: Vec<[u8; 3]>) -> Self {
        self.local_table = Some(table);
        self
    }

    pub fn truncate_lzw(mut self, bytes: usize) -> Self {
        self.truncate_lzw = Some(bytes);
        self
    }

    // rows regrouped in the four-pass interlace order
    fn stream_order(&self) -> Vec<u8> {
        if !self.interlaced {
            return self.indices.clone();
        }
        let width = usize::from(self.width);
        let height = usize::from(self.height);
        let passes = [(0, 8), (4, 8), (2, 4), (1, 2)];

        let mut out = Vec::with_capacity(self.indices.len());
        for (start, step) in passes {
            for row in (start..height).step_by(step) {
                out.extend_from_slice(&self.indices[row * width..(row + 1) * width]);
            }
        }
        out
    }
}

/// Exponent for the 3-bit table size field and the padded entry count.
fn table_size(len: usize) -> (u8, usize) {
    let mut exponent = 0;
    while (2usize << exponent) < len {
        exponent += 1;
    }
    (exponent, 2 << exponent)
}

fn write_table(bytes: &mut Vec<u8>, table: &[[u8; 3]]) -> u8 {
    let (exponent, size) = table_size(table.len());
    for entry in table {
        bytes.extend_from_slice(entry);
    }
    for _ in table.len()..size {
        bytes.extend_from_slice(&BLACK);
    }
    exponent
}

fn write_sub_blocks(bytes: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(255) {
        bytes.push(chunk.len() as u8);
        bytes.extend_from_slice(chunk);
    }
    bytes.push(0);
}

pub struct GifBuilder {
    bytes: Vec<u8>,
    global_table_len: Option<usize>,
}

impl GifBuilder {
    pub fn new(width: u16, height: u16, global_table: Option<&[[u8; 3]]>, background: u8) -> Self {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());

        let mut table = Vec::new();
        let packed = match global_table {
            Some(entries) => 0b1000_0000 | write_table(&mut table, entries),
            None => 0,
        };
        bytes.extend_from_slice(&[packed, background, 0]);
        bytes.extend_from_slice(&table);

        Self {
            bytes,
            global_table_len: global_table.map(|t| table_size(t.len()).1),
        }
    }

    pub fn netscape_loop(mut self, count: u16) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xff, 0x0b]);
        self.bytes.extend_from_slice(b"NETSCAPE2.0");
        self.bytes.extend_from_slice(&[0x03, 0x01]);
        self.bytes.extend_from_slice(&count.to_le_bytes());
        self.bytes.push(0);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xfe]);
        write_sub_blocks(&mut self.bytes, text.as_bytes());
        self
    }

    pub fn application(mut self, identifier: &[u8; 11], data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xff, 0x0b]);
        self.bytes.extend_from_slice(identifier);
        write_sub_blocks(&mut self.bytes, data);
        self
    }

    pub fn raw(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn frame(mut self, frame: FrameSpec) -> Self {
        if let Some(control) = frame.control {
            let packed = (control.disposal & 0b111) << 2 | u8::from(control.transparent.is_some());
            self.bytes.extend_from_slice(&[0x21, 0xf9, 0x04, packed]);
            self.bytes.extend_from_slice(&control.delay.to_le_bytes());
            self.bytes.extend_from_slice(&[control.transparent.unwrap_or(0), 0x00]);
        }

        self.bytes.push(0x2c);
        for field in [frame.left, frame.top, frame.width, frame.height] {
            self.bytes.extend_from_slice(&field.to_le_bytes());
        }

        let mut table = Vec::new();
        let mut packed = if frame.interlaced { 0b0100_0000 } else { 0 };
        let table_len = match &frame.local_table {
            Some(entries) => {
                packed |= 0b1000_0000 | write_table(&mut table, entries);
                table_size(entries.len()).1
            }
            None => self.global_table_len.unwrap_or(2),
        };
        self.bytes.push(packed);
        self.bytes.extend_from_slice(&table);

        let min_code_size = (table_len.trailing_zeros() as u8).max(2);
        let mut lzw = weezl::encode::Encoder::new(weezl::BitOrder::Lsb, min_code_size)
            .encode(&frame.stream_order())
            .expect("lzw encoding failed");
        if let Some(len) = frame.truncate_lzw {
            lzw.truncate(len);
        }

        self.bytes.push(min_code_size);
        write_sub_blocks(&mut self.bytes, &lzw);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(0x3b);
        self.bytes
    }
}
