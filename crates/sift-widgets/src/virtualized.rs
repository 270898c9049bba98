#![forbid(unsafe_code)]

//! Virtualized list with fixed row height.
//!
//! [`VirtualizedList`] never touches item data. It knows the item count and
//! the row height, decides which index range intersects the viewport, and
//! calls a row callback once per index in that range. Only those rows are
//! *mounted*: drawn, hit-registered and recorded in
//! [`VirtualizedListState::mounted`]. Rendering cost is O(visible rows)
//! regardless of the item count.
//!
//! ```
//! use sift_core::geometry::Rect;
//! use sift_render::frame::Frame;
//! use sift_widgets::StatefulWidget;
//! use sift_widgets::virtualized::{VirtualizedList, VirtualizedListState};
//!
//! let mut state = VirtualizedListState::new();
//! let mut frame = Frame::new(20, 6);
//! let list = VirtualizedList::new(10_000, |slot, frame: &mut Frame| {
//!     let _ = (slot.index, slot.area, frame);
//! });
//! list.render(Rect::new(0, 0, 20, 6), &mut frame, &mut state);
//! assert_eq!(state.mounted(), 0..6);
//! ```

use std::ops::Range;

use crate::scrollbar::{Scrollbar, ScrollbarState};
use crate::{StatefulWidget, set_style_area};
use sift_core::geometry::Rect;
use sift_render::frame::{Frame, HitId, HitRegion};
use sift_style::Style;

/// Scroll position, highlight and the geometry of the last render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualizedListState {
    highlighted: Option<usize>,
    /// Index of the first row at the top of the viewport.
    scroll_offset: usize,
    /// Fully visible rows in the last render.
    visible_count: usize,
    /// Set when the highlight moved and must be scrolled into view.
    reveal_highlight: bool,
    mounted: Range<usize>,
    viewport: Rect,
    scrollbar: Option<Rect>,
    row_height: u16,
}

impl VirtualizedListState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Indices mounted by the last render.
    pub fn mounted(&self) -> Range<usize> {
        self.mounted.clone()
    }

    /// Back to the top with nothing highlighted.
    pub fn reset(&mut self) {
        *self = Self {
            viewport: self.viewport,
            scrollbar: self.scrollbar,
            row_height: self.row_height,
            ..Self::default()
        };
    }

    /// Rows intersecting a viewport of `viewport_height` cells, starting at
    /// `offset`. A partially visible last row is included.
    pub fn visible_range(
        offset: usize,
        total: usize,
        viewport_height: u16,
        row_height: u16,
    ) -> Range<usize> {
        let row_height = row_height.max(1) as usize;
        let rows = (viewport_height as usize).div_ceil(row_height);
        let start = offset.min(total);
        start..(start + rows).min(total)
    }

    fn max_offset(&self, total: usize) -> usize {
        total.saturating_sub(self.visible_count.max(1))
    }

    /// Scroll by `delta` rows, clamped to the content. Leaves the highlight.
    pub fn scroll(&mut self, delta: isize, total: usize) {
        let max = self.max_offset(total) as isize;
        self.scroll_offset = (self.scroll_offset as isize + delta).clamp(0, max.max(0)) as usize;
        self.reveal_highlight = false;
    }

    /// Put `index` at the top of the viewport when possible.
    pub fn scroll_to(&mut self, index: usize, total: usize) {
        self.scroll_offset = index.min(self.max_offset(total));
        self.reveal_highlight = false;
    }

    /// Highlight `index` and scroll it into view on the next render.
    pub fn highlight(&mut self, index: Option<usize>) {
        self.highlighted = index;
        self.reveal_highlight = index.is_some();
    }

    pub fn highlight_next(&mut self, total: usize) {
        self.move_highlight(1, total);
    }

    pub fn highlight_previous(&mut self, total: usize) {
        self.move_highlight(-1, total);
    }

    pub fn page_down(&mut self, total: usize) {
        self.move_highlight(self.visible_count.max(1) as isize, total);
    }

    pub fn page_up(&mut self, total: usize) {
        self.move_highlight(-(self.visible_count.max(1) as isize), total);
    }

    pub fn highlight_first(&mut self, total: usize) {
        self.highlight((total > 0).then_some(0));
    }

    pub fn highlight_last(&mut self, total: usize) {
        self.highlight(total.checked_sub(1));
    }

    fn move_highlight(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.highlight(None);
            return;
        }
        let next = match self.highlighted {
            Some(i) => (i as isize + delta).clamp(0, total as isize - 1) as usize,
            None if delta < 0 => total - 1,
            None => 0,
        };
        self.highlight(Some(next));
    }

    /// The mounted row under `(x, y)`, using the last render's geometry.
    pub fn index_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.viewport.contains(x, y) {
            return None;
        }
        let row = ((y - self.viewport.y) / self.row_height.max(1)) as usize;
        let index = self.scroll_offset + row;
        self.mounted.contains(&index).then_some(index)
    }

    /// The scrollbar track cell under `(x, y)` and the track length.
    pub fn scrollbar_cell_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let bar = self.scrollbar?;
        bar.contains(x, y)
            .then(|| ((y - bar.y) as usize, bar.height as usize))
    }

    /// Fix up offset and highlight for `total` items and `rows` visible rows.
    fn settle(&mut self, total: usize, rows: usize) {
        self.visible_count = rows;
        if let Some(h) = self.highlighted
            && h >= total
        {
            self.highlighted = total.checked_sub(1);
        }
        if self.reveal_highlight
            && let Some(h) = self.highlighted
        {
            if h < self.scroll_offset {
                self.scroll_offset = h;
            } else if rows > 0 && h >= self.scroll_offset + rows {
                self.scroll_offset = h + 1 - rows;
            }
        }
        self.reveal_highlight = false;
        self.scroll_offset = self.scroll_offset.min(self.max_offset(total));
    }
}

/// Where and how to draw one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    /// Index into the list's items.
    pub index: usize,
    /// The row's cells. May extend past the viewport, which is clipped.
    pub area: Rect,
    pub highlighted: bool,
}

/// Renders `len` rows of `row_height` through `render_row`, mounting only
/// those that intersect the viewport.
pub struct VirtualizedList<F> {
    len: usize,
    row_height: u16,
    style: Style,
    highlight_style: Style,
    show_scrollbar: bool,
    scrollbar_track: Style,
    scrollbar_thumb: Style,
    hit_id: Option<HitId>,
    render_row: F,
}

impl<F> VirtualizedList<F>
where
    F: Fn(RowSlot, &mut Frame),
{
    pub fn new(len: usize, render_row: F) -> Self {
        Self {
            len,
            row_height: 1,
            style: Style::default(),
            highlight_style: Style::default(),
            show_scrollbar: true,
            scrollbar_track: Style::default(),
            scrollbar_thumb: Style::default(),
            hit_id: None,
            render_row,
        }
    }

    #[must_use]
    pub fn row_height(mut self, height: u16) -> Self {
        self.row_height = height.max(1);
        self
    }

    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Style laid over the highlighted row before its callback runs.
    #[must_use]
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub fn show_scrollbar(mut self, show: bool) -> Self {
        self.show_scrollbar = show;
        self
    }

    #[must_use]
    pub fn scrollbar_styles(mut self, track: Style, thumb: Style) -> Self {
        self.scrollbar_track = track;
        self.scrollbar_thumb = thumb;
        self
    }

    /// Register each mounted row as a hit region carrying its index.
    #[must_use]
    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }
}

impl<F> StatefulWidget for VirtualizedList<F>
where
    F: Fn(RowSlot, &mut Frame),
{
    type State = VirtualizedListState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "VirtualizedList",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height,
            items = self.len
        )
        .entered();

        state.row_height = self.row_height;
        state.mounted = 0..0;
        state.scrollbar = None;
        state.viewport = area;
        if area.is_empty() {
            return;
        }
        set_style_area(&mut frame.buffer, area, self.style);

        let full_rows = (area.height / self.row_height) as usize;
        let needs_scrollbar = self.show_scrollbar && self.len > full_rows && area.width > 1;
        let (content, bar) = if needs_scrollbar {
            let (content, bar) = area.split_right(1);
            (content, Some(bar))
        } else {
            (area, None)
        };
        state.viewport = content;
        state.settle(self.len, full_rows);

        let range = VirtualizedListState::visible_range(
            state.scroll_offset,
            self.len,
            content.height,
            self.row_height,
        );

        frame.buffer.push_scissor(content);
        for index in range.clone() {
            let y = content.y + ((index - state.scroll_offset) * self.row_height as usize) as u16;
            let row = Rect::new(content.x, y, content.width, self.row_height);
            let highlighted = state.highlighted == Some(index);
            if highlighted {
                set_style_area(
                    &mut frame.buffer,
                    row.intersection(&content),
                    self.highlight_style,
                );
            }
            if let Some(id) = self.hit_id {
                let visible = row.intersection(&content);
                frame.register_hit(visible, id, HitRegion::Content, index as u64);
            }
            (self.render_row)(
                RowSlot {
                    index,
                    area: row,
                    highlighted,
                },
                frame,
            );
        }
        frame.buffer.pop_scissor();
        state.mounted = range;

        if let Some(bar) = bar {
            let mut scrollbar = Scrollbar::new()
                .track_style(self.scrollbar_track)
                .thumb_style(self.scrollbar_thumb);
            if let Some(id) = self.hit_id {
                scrollbar = scrollbar.hit_id(id);
            }
            let mut bar_state = ScrollbarState::new(self.len, state.scroll_offset, full_rows);
            scrollbar.render(bar, frame, &mut bar_state);
            state.scrollbar = Some(bar);
        }
    }
}
