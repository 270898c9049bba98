#![forbid(unsafe_code)]

//! Row-major cell grid with a scissor stack.
//!
//! Invariants:
//!
//! 1. `cells.len() == width * height`
//! 2. The scissor stack is never empty; its top is always inside the bounds.
//! 3. A wide character is written whole or not at all.

use crate::cell::{Cell, CellContent};
use sift_core::geometry::Rect;

/// A 2D grid of terminal cells.
///
/// ```
/// use sift_render::buffer::Buffer;
/// use sift_render::cell::Cell;
///
/// let mut buffer = Buffer::new(10, 2);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// assert_eq!(buffer.row_text(0).trim_end(), "Hi");
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissor_stack: Vec<Rect>,
}

impl Buffer {
    /// A buffer of default cells. Zero dimensions produce an empty buffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
            scissor_stack: vec![Rect::from_size(width, height)],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Write a cell, clipped to the current scissor.
    ///
    /// A transparent background keeps the background already in place. Wide
    /// characters that do not fit entirely are dropped, and any wide
    /// character partially overwritten is cleared.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = cell.content.width().max(1);
        let scissor = self.current_scissor();
        for i in 0..width {
            let Some(cx) = x.checked_add(i as u16) else {
                return;
            };
            if !scissor.contains(cx, y) {
                return;
            }
        }

        for i in 0..width {
            self.clear_overlap(x + i as u16, y);
        }

        let idx = y as usize * self.width as usize + x as usize;
        let below = self.cells[idx].bg;
        self.cells[idx] = Cell {
            bg: cell.bg.over(below),
            ..cell
        };
        for i in 1..width {
            let idx = idx + i;
            self.cells[idx] = Cell {
                bg: cell.bg.over(self.cells[idx].bg),
                ..Cell::CONTINUATION
            };
        }
    }

    /// Blank out the rest of a wide character that `(x, y)` is part of.
    fn clear_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let row_start = y as usize * self.width as usize;
        let row_end = row_start + self.width as usize;

        if self.cells[idx].is_continuation() {
            let mut head = idx;
            while head > row_start && self.cells[head].is_continuation() {
                head -= 1;
            }
            self.cells[head].content = CellContent::EMPTY;
            let mut i = head + 1;
            while i < row_end && self.cells[i].is_continuation() {
                self.cells[i].content = CellContent::EMPTY;
                i += 1;
            }
        } else if self.cells[idx].content.width() > 1 {
            let mut i = idx + 1;
            while i < row_end && self.cells[i].is_continuation() {
                self.cells[i].content = CellContent::EMPTY;
                i += 1;
            }
        }
    }

    /// Fill `rect` (clipped to the scissor) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.current_scissor().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Reset every cell to default. The scissor stack is untouched.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Restrict writes to `rect` intersected with the current scissor.
    pub fn push_scissor(&mut self, rect: Rect) {
        let next = self.current_scissor().intersection(&rect);
        self.scissor_stack.push(next);
    }

    /// Undo the last [`push_scissor`](Self::push_scissor). The base entry stays.
    pub fn pop_scissor(&mut self) {
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        }
    }

    pub fn current_scissor(&self) -> Rect {
        self.scissor_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.bounds())
    }

    /// Characters of row `y` as a string, empty cells as spaces and wide
    /// character tails skipped.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|cell| !cell.is_continuation())
            .map(|cell| cell.content.as_char().unwrap_or(' '))
            .collect()
    }

    /// Whether two buffers show the same cells.
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::PackedRgba;

    #[test]
    fn set_out_of_bounds_is_ignored() {
        let mut buf = Buffer::new(2, 1);
        buf.set(5, 0, Cell::from_char('x'));
        buf.set(0, 3, Cell::from_char('x'));
        assert_eq!(buf.row_text(0), "  ");
    }

    #[test]
    fn wide_char_writes_continuation() {
        let mut buf = Buffer::new(4, 1);
        buf.set(1, 0, Cell::from_char('界'));
        assert_eq!(buf.get(1, 0).and_then(|c| c.content.as_char()), Some('界'));
        assert!(buf.get(2, 0).is_some_and(Cell::is_continuation));
        assert_eq!(buf.row_text(0), " 界 ");
    }

    #[test]
    fn wide_char_at_edge_is_dropped() {
        let mut buf = Buffer::new(3, 1);
        buf.set(2, 0, Cell::from_char('界'));
        assert_eq!(buf.row_text(0), "   ");
    }

    #[test]
    fn overwriting_tail_clears_head() {
        let mut buf = Buffer::new(4, 1);
        buf.set(0, 0, Cell::from_char('界'));
        buf.set(1, 0, Cell::from_char('a'));
        assert_eq!(buf.row_text(0), " a  ");
    }

    #[test]
    fn transparent_bg_keeps_existing() {
        let mut buf = Buffer::new(1, 1);
        let blue = PackedRgba::rgb(0, 0, 255);
        buf.fill(buf.bounds(), Cell::default().with_bg(blue));
        buf.set(0, 0, Cell::from_char('z'));
        assert_eq!(buf.get(0, 0).map(|c| c.bg), Some(blue));
    }

    #[test]
    fn scissor_clips_writes() {
        let mut buf = Buffer::new(5, 2);
        buf.push_scissor(Rect::new(1, 0, 2, 1));
        buf.fill(buf.bounds(), Cell::from_char('#'));
        buf.pop_scissor();
        assert_eq!(buf.row_text(0), " ##  ");
        assert_eq!(buf.row_text(1), "     ");
    }

    #[test]
    fn scissor_stack_keeps_base() {
        let mut buf = Buffer::new(3, 3);
        buf.pop_scissor();
        buf.pop_scissor();
        assert_eq!(buf.current_scissor(), buf.bounds());
    }

    #[test]
    fn nested_scissors_intersect() {
        let mut buf = Buffer::new(10, 10);
        buf.push_scissor(Rect::new(0, 0, 5, 5));
        buf.push_scissor(Rect::new(3, 3, 5, 5));
        assert_eq!(buf.current_scissor(), Rect::new(3, 3, 2, 2));
    }
}
