#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, frames and the terminal presenter.

pub mod buffer;
pub mod cell;
pub mod frame;
pub mod presenter;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a single grapheme cluster in columns.
#[inline]
pub fn grapheme_width(grapheme: &str) -> usize {
    grapheme.width()
}

/// Display width of `text` in columns, summed per grapheme cluster.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}
