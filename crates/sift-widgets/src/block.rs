#![forbid(unsafe_code)]

//! Bordered container.

use crate::{Widget, draw_text_span, set_style_area};
use sift_core::geometry::{Rect, Sides};
use sift_render::cell::Cell;
use sift_render::frame::Frame;
use sift_style::Style;

/// Line-drawing glyphs for a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    /// T-junctions used when two blocks share an edge.
    pub left_tee: char,
    pub right_tee: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    Plain,
    #[default]
    Rounded,
    Ascii,
}

impl BorderType {
    pub const fn set(self) -> BorderSet {
        match self {
            BorderType::Plain => BorderSet {
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
                horizontal: '─',
                vertical: '│',
                left_tee: '├',
                right_tee: '┤',
            },
            BorderType::Rounded => BorderSet {
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
                left_tee: '├',
                right_tee: '┤',
            },
            BorderType::Ascii => BorderSet {
                top_left: '+',
                top_right: '+',
                bottom_left: '+',
                bottom_right: '+',
                horizontal: '-',
                vertical: '|',
                left_tee: '+',
                right_tee: '+',
            },
        }
    }
}

/// A box with a one-cell border and an optional title in the top edge.
#[derive(Debug, Clone, Default)]
pub struct Block<'a> {
    border_type: BorderType,
    border_style: Style,
    style: Style,
    title: Option<&'a str>,
    /// Draw tees instead of top corners, joining a block above.
    joined_top: bool,
}

impl<'a> Block<'a> {
    pub fn bordered() -> Self {
        Self::default()
    }

    pub fn border_type(mut self, border_type: BorderType) -> Self {
        self.border_type = border_type;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn joined_top(mut self, joined: bool) -> Self {
        self.joined_top = joined;
        self
    }

    /// The area left inside the border.
    pub fn inner(&self, area: Rect) -> Rect {
        area.inner(Sides::all(1))
    }
}

impl Widget for Block<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        set_style_area(&mut frame.buffer, area, self.style);

        let set = self.border_type.set();
        let glyph = |c: char| {
            let mut cell = Cell::from_char(c);
            crate::apply_style(&mut cell, self.border_style);
            cell
        };
        let (left, top, right, bottom) = (area.x, area.y, area.right() - 1, area.bottom() - 1);

        for x in left + 1..right {
            frame.buffer.set(x, top, glyph(set.horizontal));
            frame.buffer.set(x, bottom, glyph(set.horizontal));
        }
        for y in top + 1..bottom {
            frame.buffer.set(left, y, glyph(set.vertical));
            frame.buffer.set(right, y, glyph(set.vertical));
        }
        let (tl, tr) = if self.joined_top {
            (set.left_tee, set.right_tee)
        } else {
            (set.top_left, set.top_right)
        };
        frame.buffer.set(left, top, glyph(tl));
        frame.buffer.set(right, top, glyph(tr));
        frame.buffer.set(left, bottom, glyph(set.bottom_left));
        frame.buffer.set(right, bottom, glyph(set.bottom_right));

        if let Some(title) = self.title
            && area.width > 4
        {
            let style = self.border_style.patch(Style::new().bold());
            draw_text_span(&mut frame.buffer, left + 2, top, title, style, right - 1);
        }
    }
}
