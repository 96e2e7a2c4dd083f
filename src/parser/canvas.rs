//! Composites index streams onto the logical screen.
//!
//! Disposal describes what happens *after* a frame is shown, so the canvas a
//! frame is drawn over is picked from the previous frame's disposal method.

use super::color_table::ColorTable;
use super::DisposalMethod;

/// What is left of the last frame drawn.
#[derive(Debug, Clone)]
pub(crate) struct PreviousFrame {
    pub(crate) disposal: DisposalMethod,
    pub(crate) pixels: Box<[u8]>,
}

/// Screen geometry and drawing parameters of one frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameLayout<'a> {
    pub(crate) screen_width: usize,
    pub(crate) screen_height: usize,
    pub(crate) left: usize,
    pub(crate) top: usize,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) interlaced: bool,
    pub(crate) palette: &'a ColorTable,
    pub(crate) transparent_index: Option<u8>,
}

/// A screen-sized buffer filled with `color`.
pub(crate) fn background_canvas(count: usize, color: u32) -> Box<[u8]> {
    color.to_be_bytes().repeat(count).into_boxed_slice()
}

/// Picks the canvas the next frame starts from.
///
/// `restore` is the canvas as it was before the most recent `Leave` frame was
/// drawn.
pub(crate) fn base_canvas<'a>(
    previous: Option<&'a PreviousFrame>,
    restore: Option<&'a [u8]>,
    background: &'a [u8],
) -> &'a [u8] {
    match previous {
        Some(PreviousFrame {
            disposal: DisposalMethod::Leave,
            pixels,
        }) => &pixels[..],
        Some(PreviousFrame {
            disposal: DisposalMethod::RestorePrevious,
            ..
        }) => restore.unwrap_or(background),
        Some(PreviousFrame {
            disposal: DisposalMethod::Unknown | DisposalMethod::RestoreToBackground,
            ..
        })
        | None => background,
    }
}

/// Row of the index stream holding destination row `row` of an interlaced
/// frame `height` rows tall.
///
/// Pass 1 stores every 8th row from 0, pass 2 every 8th from 4, pass 3 every
/// 4th from 2 and pass 4 every 2nd from 1.
pub(crate) fn interlaced_source_row(row: usize, height: usize) -> usize {
    let pass_two = (height + 7) / 8;
    let pass_three = (height + 3) / 4;
    let pass_four = (height + 1) / 2;

    if row % 8 == 0 {
        row / 8
    } else if row % 4 == 0 {
        pass_two + (row - 4) / 8
    } else if row % 2 == 0 {
        pass_three + (row - 2) / 4
    } else {
        pass_four + (row - 1) / 2
    }
}

/// Draws `indices` over a copy of `base`. Transparent pixels and everything
/// outside the frame rectangle keep the base canvas value; parts of the
/// rectangle past the screen edge are dropped.
pub(crate) fn composite(layout: &FrameLayout<'_>, indices: &[u8], base: &[u8]) -> Box<[u8]> {
    let mut pixels = base.to_vec();
    let stride = layout.screen_width * 4;

    let visible_width = layout
        .width
        .min(layout.screen_width.saturating_sub(layout.left));
    if visible_width == 0 {
        return pixels.into_boxed_slice();
    }

    for row in 0..layout.height {
        let y = layout.top + row;
        if y >= layout.screen_height {
            break;
        }

        let source_row = if layout.interlaced {
            interlaced_source_row(row, layout.height)
        } else {
            row
        };
        let line = &indices[source_row * layout.width..][..visible_width];
        let out = &mut pixels[y * stride + layout.left * 4..][..visible_width * 4];

        for (&index, pixel) in line.iter().zip(out.chunks_exact_mut(4)) {
            if layout.transparent_index == Some(index) {
                continue;
            }
            pixel.copy_from_slice(&layout.palette.color(index).to_be_bytes());
        }
    }

    pixels.into_boxed_slice()
}
