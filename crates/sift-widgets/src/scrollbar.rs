#![forbid(unsafe_code)]

//! Vertical scrollbar.

use crate::StatefulWidget;
use sift_core::geometry::Rect;
use sift_render::cell::Cell;
use sift_render::frame::{Frame, HitId, HitRegion};
use sift_style::Style;

/// Content and viewport extents the scrollbar reflects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollbarState {
    pub content_length: usize,
    pub position: usize,
    pub viewport_length: usize,
}

impl ScrollbarState {
    pub fn new(content_length: usize, position: usize, viewport_length: usize) -> Self {
        Self {
            content_length,
            position,
            viewport_length,
        }
    }

    /// Thumb `(offset, size)` within a track of `track_len` cells.
    pub fn thumb(&self, track_len: usize) -> (usize, usize) {
        if track_len == 0 || self.content_length == 0 {
            return (0, 0);
        }
        let ratio = self.viewport_length.min(self.content_length) as f64
            / self.content_length as f64;
        let size = ((track_len as f64 * ratio).round() as usize).clamp(1, track_len);

        let max_pos = self.content_length.saturating_sub(self.viewport_length);
        let pos_ratio = if max_pos == 0 {
            0.0
        } else {
            self.position.min(max_pos) as f64 / max_pos as f64
        };
        let offset = ((track_len - size) as f64 * pos_ratio).round() as usize;
        (offset, size)
    }

    /// Content position corresponding to a click on track cell `cell`.
    pub fn position_for_track_cell(&self, cell: usize, track_len: usize) -> usize {
        let max_pos = self.content_length.saturating_sub(self.viewport_length);
        if track_len <= 1 {
            return 0;
        }
        let ratio = cell.min(track_len - 1) as f64 / (track_len - 1) as f64;
        (max_pos as f64 * ratio).round() as usize
    }
}

/// Scrollbar drawn in a one-column area. Each track cell registers a hit
/// whose data is the cell's offset from the top.
#[derive(Debug, Clone, Default)]
pub struct Scrollbar {
    track_style: Style,
    thumb_style: Style,
    track_symbol: char,
    thumb_symbol: char,
    hit_id: Option<HitId>,
}

impl Scrollbar {
    pub fn new() -> Self {
        Self {
            track_symbol: '│',
            thumb_symbol: '█',
            ..Self::default()
        }
    }

    pub fn track_style(mut self, style: Style) -> Self {
        self.track_style = style;
        self
    }

    pub fn thumb_style(mut self, style: Style) -> Self {
        self.thumb_style = style;
        self
    }

    pub fn symbols(mut self, track: char, thumb: char) -> Self {
        self.track_symbol = track;
        self.thumb_symbol = thumb;
        self
    }

    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }
}

impl StatefulWidget for Scrollbar {
    type State = ScrollbarState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "Scrollbar",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() || state.content_length == 0 {
            return;
        }
        let track_len = area.height as usize;
        let (offset, size) = state.thumb(track_len);
        let x = area.right() - 1;

        for i in 0..track_len {
            let y = area.y + i as u16;
            let on_thumb = i >= offset && i < offset + size;
            let (symbol, style) = if on_thumb {
                (self.thumb_symbol, self.thumb_style)
            } else {
                (self.track_symbol, self.track_style)
            };
            let mut cell = Cell::from_char(symbol);
            crate::apply_style(&mut cell, style);
            frame.buffer.set(x, y, cell);

            if let Some(id) = self.hit_id {
                frame.register_hit(Rect::new(x, y, 1, 1), id, HitRegion::Scrollbar, i as u64);
            }
        }
    }
}
