use std::io;

use thiserror::Error;

/// Fatal decoding failures. Every variant ends the decoding session it was
/// returned from.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("signature is invalid, expected GIF magic")]
    InvalidSignature,

    #[error("stream ended while {needed} more bytes were required")]
    TruncatedStream { needed: usize },

    #[error("frame at ({left}, {top}) has neither a local nor a global color table")]
    MissingColorTable { left: u16, top: u16 },

    #[error("encountered unexpected block introducer 0x{0:02x}")]
    UnexpectedBlockType(u8),

    #[error("decoding session already terminated")]
    Terminated,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
