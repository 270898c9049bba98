#![forbid(unsafe_code)]

//! Widgets for sift: the searchable select and the pieces it is built from.

pub mod block;
pub mod click_outside;
pub mod debounce;
pub mod filter;
pub mod input;
pub mod scrollbar;
pub mod select;
pub mod virtualized;

pub use click_outside::{Bounds, OutsideClickGuard, OutsideClickHub};
pub use debounce::Debounced;
pub use filter::{SelectOption, filter_indices};
pub use select::{SearchableSelect, SelectAction, SelectConfig};
pub use virtualized::{RowSlot, VirtualizedList, VirtualizedListState};

use sift_core::geometry::Rect;
use sift_render::buffer::Buffer;
use sift_render::cell::Cell;
use sift_render::frame::Frame;
use sift_style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A renderable component.
///
/// Widgets draw into the frame's buffer within `area`, and may position the
/// cursor or register hit regions on the frame.
pub trait Widget {
    fn render(&self, area: Rect, frame: &mut Frame);
}

/// A widget whose rendering reads and updates external state.
pub trait StatefulWidget {
    type State;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State);
}

#[inline]
pub(crate) fn apply_style(cell: &mut Cell, style: Style) {
    style.apply_to(cell);
}

/// Apply a style to every cell in `area`, keeping their content.
pub(crate) fn set_style_area(buf: &mut Buffer, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    let area = area.intersection(&buf.bounds());
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = buf.get_mut(x, y) {
                apply_style(cell, style);
            }
        }
    }
}

/// Draw `content` starting at `(x, y)`, stopping before `max_x`.
///
/// Returns the column after the last drawn grapheme. A grapheme that would
/// straddle `max_x` is not drawn.
pub(crate) fn draw_text_span(
    buf: &mut Buffer,
    mut x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    for grapheme in content.graphemes(true) {
        if x >= max_x {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        if w == 0 {
            continue;
        }
        if x as usize + w > max_x as usize {
            break;
        }
        if let Some(c) = grapheme.chars().next() {
            let mut cell = Cell::from_char(c);
            apply_style(&mut cell, style);
            buf.set(x, y, cell);
        }
        x = x.saturating_add(w as u16);
    }
    x
}
