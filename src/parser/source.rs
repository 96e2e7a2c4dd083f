use std::io::{self, Read};

use super::error::{DecodeError, Result};

// Smallest read issued against the inner reader when the buffer runs dry.
const FILL_CHUNK: usize = 8 * 1024;

/// Buffered, forward-only byte cursor over a reader.
///
/// Bytes can be peeked without being consumed, but the read position never
/// moves backwards.
#[derive(Debug)]
pub struct ByteSource<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    // start of the unconsumed bytes in `buffer`
    cursor: usize,
    // total bytes consumed so far
    position: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            cursor: 0,
            position: 0,
        }
    }

    /// Number of bytes consumed since the start of the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn buffered(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Tries to make `count` bytes available without consuming them. Returns
    /// `false` if the inner reader hits end-of-stream first.
    pub fn request(&mut self, count: usize) -> Result<bool> {
        while self.buffered() < count {
            if self.cursor > 0 {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            }

            let filled = self.buffer.len();
            let wanted = FILL_CHUNK.max(count - filled);
            self.buffer.resize(filled + wanted, 0);

            let read = loop {
                match self.inner.read(&mut self.buffer[filled..]) {
                    Ok(read) => break read,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buffer.truncate(filled);
                        return Err(e.into());
                    }
                }
            };
            self.buffer.truncate(filled + read);

            if read == 0 {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Fails with `TruncatedStream` unless `count` bytes are available.
    pub fn require(&mut self, count: usize) -> Result<()> {
        if self.request(count)? {
            Ok(())
        } else {
            Err(DecodeError::TruncatedStream {
                needed: count - self.buffered(),
            })
        }
    }

    /// Compares the buffered bytes at `offset` against `expected` without
    /// consuming anything. Missing bytes compare unequal.
    pub fn peek_range(&mut self, offset: usize, expected: &[u8]) -> Result<bool> {
        if !self.request(offset + expected.len())? {
            return Ok(false);
        }

        let start = self.cursor + offset;
        Ok(&self.buffer[start..start + expected.len()] == expected)
    }

    /// Returns up to `count` buffered bytes without consuming them.
    pub fn peek(&mut self, count: usize) -> Result<&[u8]> {
        self.request(count)?;
        let end = self.cursor + count.min(self.buffered());
        Ok(&self.buffer[self.cursor..end])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        let byte = self.buffer[self.cursor];
        self.advance(1);
        Ok(byte)
    }

    // GIF89a: multi-byte numeric fields are little endian
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buffer = [0; 2];
        self.read_exact(&mut buffer)?;
        Ok(u16::from_le_bytes(buffer))
    }

    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        self.require(out.len())?;
        out.copy_from_slice(&self.buffer[self.cursor..self.cursor + out.len()]);
        self.advance(out.len());
        Ok(())
    }

    pub fn skip(&mut self, mut count: usize) -> Result<()> {
        while count > 0 {
            if self.buffered() == 0 && !self.request(1)? {
                return Err(DecodeError::TruncatedStream { needed: count });
            }
            let step = count.min(self.buffered());
            self.advance(step);
            count -= step;
        }
        Ok(())
    }

    /// Reads a sequence of data sub-blocks up to and including the
    /// zero-length block terminator.
    pub fn read_sub_blocks(&mut self) -> Result<Vec<u8>> {
        let mut block_size = self.read_u8()?;

        // there could be more than one block, but we do know we'll at least have 1 sub-block.
        let mut result = Vec::with_capacity(block_size.into());

        while block_size != 0 {
            let start = result.len();
            result.resize(start + usize::from(block_size), 0);
            self.read_exact(&mut result[start..])?;

            block_size = self.read_u8()?;
        }

        Ok(result)
    }

    /// Like `read_sub_blocks`, but discards the data.
    pub fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            match self.read_u8()? {
                0 => return Ok(()),
                block_size => self.skip(block_size.into())?,
            }
        }
    }

    fn advance(&mut self, count: usize) {
        self.cursor += count;
        self.position += count as u64;
    }
}
