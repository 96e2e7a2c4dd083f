use std::io::Read;

use log::debug;

use super::bit_reader::BitReader;
use super::error::Result;
use super::source::ByteSource;

/// Dictionary capacity; codes are at most 12 bits wide.
const MAX_CODES: usize = 4096;
const MAX_MIN_CODE_SIZE: u8 = 11;
// upfront reservation for the index buffer, the rest grows as codes arrive
const INITIAL_CAPACITY: usize = 1 << 16;

/// How an index stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// All pixels were produced, or the end code was seen.
    Complete,
    /// The sub-blocks ran out after `decoded` pixels.
    Truncated { decoded: usize },
    /// A code referred past the dictionary, or the minimum code size was
    /// unusable. Decoding stopped there.
    Desync { code: u16, available: usize },
}

/// GIF flavored LZW decompressor. The code tables are kept between frames so
/// an animation only allocates them once.
pub struct LzwDecoder {
    prefix: Box<[u16]>,
    suffix: Box<[u8]>,
    stack: Vec<u8>,
    // next free dictionary slot, left as it was at the end of the last frame
    available: usize,
}

impl Default for LzwDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LzwDecoder {
    pub fn new() -> Self {
        Self {
            prefix: vec![0; MAX_CODES].into_boxed_slice(),
            suffix: vec![0; MAX_CODES].into_boxed_slice(),
            stack: Vec::with_capacity(MAX_CODES + 1),
            available: 0,
        }
    }

    /// Reads the minimum code size byte and the image data sub-blocks that
    /// follow it, producing exactly `count` indices. Missing indices are
    /// zero. The source is always left just past the block terminator.
    pub fn decode<R: Read>(
        &mut self,
        source: &mut ByteSource<R>,
        count: usize,
    ) -> Result<(Box<[u8]>, LzwStatus)> {
        let min_code_size = source.read_u8()?;
        let mut indices = Vec::with_capacity(count.min(INITIAL_CAPACITY));

        let mut reader = BitReader::new(source);
        let status = if (1..=MAX_MIN_CODE_SIZE).contains(&min_code_size) {
            self.decode_codes(&mut reader, min_code_size, count, &mut indices)?
        } else {
            debug!("unusable lzw minimum code size {}", min_code_size);
            LzwStatus::Desync {
                code: 0,
                available: 0,
            }
        };
        reader.finish()?;

        indices.truncate(count);
        indices.resize(count, 0);
        debug!("decoded {} indices, status {:?}", count, status);

        Ok((indices.into_boxed_slice(), status))
    }

    fn decode_codes<R: Read>(
        &mut self,
        reader: &mut BitReader<'_, R>,
        min_code_size: u8,
        count: usize,
        out: &mut Vec<u8>,
    ) -> Result<LzwStatus> {
        let clear_code = 1usize << min_code_size;
        let end_code = clear_code + 1;

        let mut code_size = u32::from(min_code_size) + 1;
        let mut code_mask = (1usize << code_size) - 1;
        self.available = clear_code + 2;
        let mut old_code: Option<usize> = None;
        let mut first = 0u8;

        for code in 0..clear_code {
            self.prefix[code] = 0;
            self.suffix[code] = code as u8;
        }

        while out.len() < count {
            let Some(code) = reader.next(code_size)? else {
                return Ok(LzwStatus::Truncated { decoded: out.len() });
            };
            let mut code = usize::from(code);

            if code == clear_code {
                code_size = u32::from(min_code_size) + 1;
                code_mask = (1 << code_size) - 1;
                self.available = clear_code + 2;
                old_code = None;
                continue;
            }

            if code == end_code {
                return Ok(LzwStatus::Complete);
            }

            if code > self.available {
                return Ok(self.desync(code));
            }

            let Some(previous) = old_code else {
                // only a literal can follow a clear
                if code >= clear_code {
                    return Ok(self.desync(code));
                }
                out.push(self.suffix[code]);
                old_code = Some(code);
                first = code as u8;
                continue;
            };

            let in_code = code;
            if code >= self.available {
                // KwKwK: the code being defined by this very step
                self.stack.push(first);
                code = previous;
            }

            while code >= clear_code {
                if self.stack.len() > MAX_CODES {
                    // prefix chain loops back on itself
                    self.stack.clear();
                    return Ok(self.desync(in_code));
                }
                self.stack.push(self.suffix[code]);
                code = usize::from(self.prefix[code]);
            }

            first = self.suffix[code];
            self.stack.push(first);

            if self.available < MAX_CODES {
                self.prefix[self.available] = previous as u16;
                self.suffix[self.available] = first;
                self.available += 1;

                if self.available & code_mask == 0 && self.available < MAX_CODES {
                    code_size += 1;
                    code_mask += self.available;
                }
            }

            old_code = Some(in_code);

            out.extend(self.stack.drain(..).rev());
        }

        Ok(LzwStatus::Complete)
    }

    fn desync(&self, code: usize) -> LzwStatus {
        debug!(
            "lzw code {} is not in the dictionary ({} entries), dropping rest of frame",
            code, self.available
        );
        LzwStatus::Desync {
            code: code as u16,
            available: self.available,
        }
    }
}
