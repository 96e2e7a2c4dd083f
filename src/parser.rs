mod bit_reader;
mod canvas;
mod color_table;
mod decoder;
mod error;
mod frame;
mod header;
mod lzw;
mod source;

pub use color_table::ColorTable;
pub use decoder::{Decoder, Frames};
pub use error::DecodeError;
pub use frame::{Frame, GraphicControl, ImageDescriptor};
pub use header::{Header, Version};
pub use lzw::{LzwDecoder, LzwStatus};
pub use source::ByteSource;

/// What to do with the canvas after a frame has been shown.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    #[default]
    Unknown = 0,
    Leave = 1,
    RestoreToBackground = 2,
    RestorePrevious = 3,
}

impl DisposalMethod {
    /// Reserved values 4-7 decode as `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => DisposalMethod::Leave,
            2 => DisposalMethod::RestoreToBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::Unknown,
        }
    }
}
