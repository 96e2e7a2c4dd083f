use std::io::Read;

use super::error::Result;
use super::source::ByteSource;

/// Pulls variable-width codes, least significant bit first, out of a GIF
/// data sub-block stream.
pub(crate) struct BitReader<'a, R: Read> {
    source: &'a mut ByteSource<R>,
    // bytes left in the current sub-block
    remaining: usize,
    datum: u32,
    bits: u32,
    terminated: bool,
}

impl<'a, R: Read> BitReader<'a, R> {
    pub(crate) fn new(source: &'a mut ByteSource<R>) -> Self {
        Self {
            source,
            remaining: 0,
            datum: 0,
            bits: 0,
            terminated: false,
        }
    }

    /// Next `count` bit code, or `None` once the zero-length terminator
    /// block is reached. `count` is at most 12.
    pub(crate) fn next(&mut self, count: u32) -> Result<Option<u16>> {
        while self.bits < count {
            if self.remaining == 0 {
                if self.terminated {
                    return Ok(None);
                }
                self.remaining = self.source.read_u8()?.into();
                if self.remaining == 0 {
                    self.terminated = true;
                    return Ok(None);
                }
            }

            self.datum |= u32::from(self.source.read_u8()?) << self.bits;
            self.bits += 8;
            self.remaining -= 1;
        }

        let code = self.datum & ((1 << count) - 1);
        self.datum >>= count;
        self.bits -= count;
        Ok(Some(code as u16))
    }

    /// Drops whatever is left of the sub-block stream, terminator included.
    pub(crate) fn finish(self) -> Result<()> {
        self.source.skip(self.remaining)?;
        if !self.terminated {
            self.source.skip_sub_blocks()?;
        }
        Ok(())
    }
}
