use std::io::Read;
use std::iter::FusedIterator;

use log::{debug, warn};

use super::canvas::{self, FrameLayout, PreviousFrame};
use super::error::{DecodeError, Result};
use super::frame::{Frame, GraphicControl, ImageDescriptor};
use super::header::{self, Header, Version};
use super::lzw::{LzwDecoder, LzwStatus};
use super::source::ByteSource;
use super::DisposalMethod;

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR_LABEL: u8 = 0x2c;
const TRAILER_LABEL: u8 = 0x3b;

// Extension labels
const APPLICATION_EXTENSION: u8 = 0xff;
const COMMENT_EXTENSION: u8 = 0xfe;
const GRAPHIC_CONTROL_EXTENSION: u8 = 0xf9;
const PLAIN_TEXT_EXTENSION: u8 = 0x01;

#[derive(Debug)]
enum ExtensionType {
    Application,
    Comment,
    GraphicControl,
    PlainText,
    Unknown(u8),
}

impl From<u8> for ExtensionType {
    fn from(value: u8) -> Self {
        match value {
            APPLICATION_EXTENSION => ExtensionType::Application,
            COMMENT_EXTENSION => ExtensionType::Comment,
            GRAPHIC_CONTROL_EXTENSION => ExtensionType::GraphicControl,
            PLAIN_TEXT_EXTENSION => ExtensionType::PlainText,
            label => ExtensionType::Unknown(label),
        }
    }
}

/// Position of the session within the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Signature,
    Header(Version),
    Body,
    Done,
}

/// Steps taken while reading one frame out of the body.
#[derive(Debug)]
enum ParserState {
    DetermineNextBlock(Option<GraphicControl>),
    ProcessExtension(u8, Option<GraphicControl>),
    ProcessImageDescriptor(Option<GraphicControl>),
    ProcessImageData(GraphicControl, ImageDescriptor),
    FrameReady(Box<Frame>),
    Trailer,
}

/// Pull-based GIF decoder producing one fully composited frame per call.
///
/// A decoder is a single sequential session over one reader. It is not
/// reentrant; decode concurrently by giving each thread its own decoder and
/// its own reader. Any error ends the session: later `read_frame` calls
/// report end-of-stream.
pub struct Decoder<R: Read> {
    source: ByteSource<R>,
    section: Section,
    header: Option<Header>,
    background: Box<[u8]>,
    lzw: LzwDecoder,
    previous: Option<PreviousFrame>,
    // canvas as it was before the most recent Leave frame was drawn
    restore: Option<Box<[u8]>>,
    frames_read: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            source: ByteSource::new(inner),
            section: Section::Signature,
            header: None,
            background: Box::default(),
            lzw: LzwDecoder::new(),
            previous: None,
            restore: None,
            frames_read: 0,
        }
    }

    /// Reads the signature, logical screen descriptor, global color table
    /// and optional Netscape extension. Later calls return the same header.
    pub fn read_header(&mut self) -> Result<&Header> {
        while let Section::Signature | Section::Header(_) = self.section {
            debug!("begin parsing section {:?}", self.section);

            match self.process_section(self.section) {
                Ok(next) => self.section = next,
                Err(e) => {
                    self.section = Section::Done;
                    return Err(e);
                }
            }
        }

        self.header.as_ref().ok_or(DecodeError::Terminated)
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Decodes the next frame, reading the header first if that has not
    /// happened yet. `Ok(None)` marks the end of the stream.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        if let Section::Signature | Section::Header(_) = self.section {
            self.read_header()?;
        }
        if self.section == Section::Done {
            return Ok(None);
        }

        let mut state = ParserState::DetermineNextBlock(None);
        loop {
            debug!("begin parsing state {:?}", state);

            state = match self.process_next_state(state) {
                Ok(next) => next,
                Err(e) => {
                    self.section = Section::Done;
                    return Err(e);
                }
            };

            match state {
                ParserState::FrameReady(frame) => {
                    self.frames_read += 1;
                    return Ok(Some(*frame));
                }
                ParserState::Trailer => {
                    debug!("reached trailer after {} frames", self.frames_read);
                    self.section = Section::Done;
                    return Ok(None);
                }
                next => state = next,
            }
        }
    }

    /// Iterates over the remaining frames.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { decoder: self }
    }

    /// Number of frames produced so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }

    fn process_section(&mut self, section: Section) -> Result<Section> {
        match section {
            Section::Signature => {
                let version = header::read_signature(&mut self.source)?;
                debug!("processed signature, got version {:?}", version);
                Ok(Section::Header(version))
            }
            Section::Header(version) => {
                let header = header::read_screen(&mut self.source, version)?;
                self.background =
                    canvas::background_canvas(header.pixel_count(), header.background_color());
                self.header = Some(header);
                Ok(Section::Body)
            }
            Section::Body | Section::Done => Ok(section),
        }
    }

    fn process_next_state(&mut self, state: ParserState) -> Result<ParserState> {
        use ParserState::*;

        match state {
            DetermineNextBlock(graphic_control) => {
                let introducer_or_label = self.source.read_u8()?;

                match introducer_or_label {
                    // extension introducer means that a label follows determining what exact type
                    // of extension it is.
                    EXTENSION_INTRODUCER => {
                        Ok(ProcessExtension(self.source.read_u8()?, graphic_control))
                    }
                    IMAGE_DESCRIPTOR_LABEL => Ok(ProcessImageDescriptor(graphic_control)),
                    TRAILER_LABEL => Ok(Trailer),
                    label => Err(DecodeError::UnexpectedBlockType(label)),
                }
            }
            ProcessExtension(label, graphic_control) => {
                self.process_extension(ExtensionType::from(label), graphic_control)
            }
            ProcessImageDescriptor(graphic_control) => {
                let descriptor = ImageDescriptor::read(&mut self.source)?;

                let has_global_table = self
                    .header
                    .as_ref()
                    .is_some_and(|header| header.global_color_table.is_some());
                if descriptor.local_color_table.is_none() && !has_global_table {
                    return Err(DecodeError::MissingColorTable {
                        left: descriptor.left,
                        top: descriptor.top,
                    });
                }

                Ok(ProcessImageData(graphic_control.unwrap_or_default(), descriptor))
            }
            ProcessImageData(graphic_control, descriptor) => {
                let frame = self.process_image_data(graphic_control, descriptor)?;
                Ok(FrameReady(Box::new(frame)))
            }
            FrameReady(_) | Trailer => Ok(state),
        }
    }

    fn process_extension(
        &mut self,
        label: ExtensionType,
        graphic_control: Option<GraphicControl>,
    ) -> Result<ParserState> {
        debug!("processing extension type: {:?}", label);

        match label {
            ExtensionType::GraphicControl => Ok(ParserState::DetermineNextBlock(Some(
                GraphicControl::read(&mut self.source)?,
            ))),
            ExtensionType::Comment => {
                // sequence of data sub-blocks
                let data = self.source.read_sub_blocks()?;
                debug!("processed comment block, got: {}", String::from_utf8_lossy(&data));
                Ok(ParserState::DetermineNextBlock(graphic_control))
            }
            ExtensionType::Unknown(label) => {
                debug!("skipping unknown extension 0x{:02x}", label);
                self.skip_extension(graphic_control)
            }
            ExtensionType::Application | ExtensionType::PlainText => {
                self.skip_extension(graphic_control)
            }
        }
    }

    fn skip_extension(&mut self, graphic_control: Option<GraphicControl>) -> Result<ParserState> {
        let block_size = self.source.read_u8()?;
        self.source.skip(block_size.into())?;
        self.source.skip_sub_blocks()?;
        Ok(ParserState::DetermineNextBlock(graphic_control))
    }

    fn process_image_data(
        &mut self,
        graphic_control: GraphicControl,
        descriptor: ImageDescriptor,
    ) -> Result<Frame> {
        let header = self.header.as_ref().ok_or(DecodeError::Terminated)?;
        let (indices, status) = self.lzw.decode(&mut self.source, descriptor.pixel_count())?;
        match status {
            LzwStatus::Complete => {}
            LzwStatus::Truncated { decoded } => warn!(
                "frame {} image data ended after {} of {} pixels, filling the rest with index 0",
                self.frames_read,
                decoded,
                indices.len()
            ),
            LzwStatus::Desync { code, available } => warn!(
                "frame {} lost lzw sync at code {} ({} entries), filling the rest with index 0",
                self.frames_read, code, available
            ),
        }

        let (pixels, snapshot) = {
            let palette = descriptor
                .local_color_table
                .as_ref()
                .or(header.global_color_table.as_ref())
                .ok_or(DecodeError::MissingColorTable {
                    left: descriptor.left,
                    top: descriptor.top,
                })?;

            let layout = FrameLayout {
                screen_width: header.width.into(),
                screen_height: header.height.into(),
                left: descriptor.left.into(),
                top: descriptor.top.into(),
                width: descriptor.width.into(),
                height: descriptor.height.into(),
                interlaced: descriptor.interlaced,
                palette,
                transparent_index: graphic_control.transparent_index,
            };

            let base = canvas::base_canvas(
                self.previous.as_ref(),
                self.restore.as_deref(),
                &self.background,
            );
            let pixels = canvas::composite(&layout, &indices, base);
            let snapshot =
                (graphic_control.disposal == DisposalMethod::Leave).then(|| Box::<[u8]>::from(base));
            (pixels, snapshot)
        };

        if snapshot.is_some() {
            self.restore = snapshot;
        }
        self.previous = Some(PreviousFrame {
            disposal: graphic_control.disposal,
            pixels: pixels.clone(),
        });

        Ok(Frame::new(graphic_control, descriptor, indices, pixels, status))
    }
}

/// Iterator over the frames of a [`Decoder`].
pub struct Frames<'a, R: Read> {
    decoder: &'a mut Decoder<R>,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.read_frame().transpose()
    }
}

impl<R: Read> FusedIterator for Frames<'_, R> {}
