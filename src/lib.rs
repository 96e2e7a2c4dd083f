//! Streaming GIF decoder.
//!
//! Parses GIF87a/89a streams frame by frame, decompresses each frame's LZW
//! index stream and composites it onto a full logical-screen ARGB canvas,
//! honoring transparency, interlacing and disposal methods.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("animation.gif")?);
//! let mut decoder = gifstream::Decoder::new(file);
//! let header = decoder.read_header()?;
//! println!("{}x{}, loop count {}", header.width, header.height, header.loop_count);
//!
//! while let Some(frame) = decoder.read_frame()? {
//!     println!("{} ms, {} bytes of ARGB", frame.delay_ms, frame.pixels.len());
//! }
//! # Ok::<(), gifstream::DecodeError>(())
//! ```

pub mod parser;

pub use parser::{
    ColorTable, DecodeError, Decoder, DisposalMethod, Frame, Frames, Header, LzwStatus, Version,
};
