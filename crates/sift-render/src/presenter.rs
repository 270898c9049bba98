#![forbid(unsafe_code)]

//! Presenter: diff frames and emit only what changed.
//!
//! The presenter remembers the last buffer it wrote. Each call to
//! [`Presenter::present`] compares the new frame cell by cell, moves the
//! cursor only when the next changed cell is not where the previous write
//! left it, and re-sends colors and attributes only when they differ from
//! the current terminal state. Output for a frame is wrapped in a
//! synchronized update and flushed once.

use std::io::{self, BufWriter, Write};

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::buffer::Buffer;
use crate::cell::{Cell, PackedRgba, StyleFlags};
use crate::frame::Frame;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        }
    }
}

/// State-tracked terminal writer.
#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Buffer>,
    style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            style: None,
            cursor: None,
        }
    }

    /// Forget what is on screen so the next frame is written in full.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.style = None;
        self.cursor = None;
    }

    /// Write the difference between the last presented frame and `frame`.
    ///
    /// Returns the number of cells written.
    pub fn present(&mut self, frame: &Frame) -> io::Result<usize> {
        let buffer = &frame.buffer;
        queue!(self.writer, terminal::BeginSynchronizedUpdate)?;

        let full = match &self.previous {
            Some(prev) => prev.width() != buffer.width() || prev.height() != buffer.height(),
            None => true,
        };
        if full {
            queue!(
                self.writer,
                SetAttribute(Attribute::Reset),
                terminal::Clear(terminal::ClearType::All)
            )?;
            self.style = None;
            self.cursor = None;
        }

        let mut written = 0;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                if cell.is_continuation() {
                    continue;
                }
                let unchanged = !full
                    && self
                        .previous
                        .as_ref()
                        .and_then(|prev| prev.get(x, y))
                        .is_some_and(|old| old == cell);
                if unchanged {
                    continue;
                }
                self.emit_cell(x, y, cell)?;
                written += 1;
            }
        }

        match frame.cursor_position {
            Some((x, y)) if frame.cursor_visible => {
                queue!(self.writer, cursor::MoveTo(x, y), cursor::Show)?;
                self.cursor = Some((x, y));
            }
            _ => queue!(self.writer, cursor::Hide)?,
        }

        queue!(self.writer, terminal::EndSynchronizedUpdate)?;
        self.writer.flush()?;
        self.previous = Some(buffer.clone());

        #[cfg(feature = "tracing")]
        tracing::trace!(written, full, "frame presented");
        Ok(written)
    }

    fn emit_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.writer, cursor::MoveTo(x, y))?;
        }
        self.emit_style(cell)?;
        let ch = cell.content.as_char().unwrap_or(' ');
        queue!(self.writer, Print(ch))?;
        let advance = cell.content.width().max(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    fn emit_style(&mut self, cell: &Cell) -> io::Result<()> {
        let next = CellStyle::from_cell(cell);
        if self.style == Some(next) {
            return Ok(());
        }
        let prev_attrs = self.style.map(|s| s.attrs);
        if prev_attrs != Some(next.attrs) {
            queue!(self.writer, SetAttribute(Attribute::Reset))?;
            for (flag, attr) in [
                (StyleFlags::BOLD, Attribute::Bold),
                (StyleFlags::DIM, Attribute::Dim),
                (StyleFlags::ITALIC, Attribute::Italic),
                (StyleFlags::UNDERLINE, Attribute::Underlined),
                (StyleFlags::REVERSE, Attribute::Reverse),
            ] {
                if next.attrs.contains(flag) {
                    queue!(self.writer, SetAttribute(attr))?;
                }
            }
            // Attribute reset also resets colors.
            self.style = None;
        }
        if self.style.map(|s| s.fg) != Some(next.fg) {
            queue!(self.writer, SetForegroundColor(to_color(next.fg)))?;
        }
        if self.style.map(|s| s.bg) != Some(next.bg) {
            queue!(self.writer, SetBackgroundColor(to_color(next.bg)))?;
        }
        self.style = Some(next);
        Ok(())
    }

    /// Flush buffered output and return the writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}

fn to_color(color: PackedRgba) -> Color {
    if color.a() == 0 {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r(),
            g: color.g(),
            b: color.b(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_frame(text: &str) -> Frame {
        let mut frame = Frame::new(8, 1);
        for (i, c) in text.chars().enumerate() {
            frame.buffer.set(i as u16, 0, Cell::from_char(c));
        }
        frame
    }

    fn output(presenter: Presenter<Vec<u8>>) -> String {
        String::from_utf8_lossy(&presenter.into_inner().unwrap_or_default()).into_owned()
    }

    #[test]
    fn first_frame_writes_every_cell() {
        let mut presenter = Presenter::new(Vec::new());
        let written = presenter.present(&text_frame("hi")).unwrap();
        assert_eq!(written, 8);
        assert!(output(presenter).contains("hi"));
    }

    #[test]
    fn identical_frame_writes_nothing() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&text_frame("hi")).unwrap();
        assert_eq!(presenter.present(&text_frame("hi")).unwrap(), 0);
    }

    #[test]
    fn only_changed_cells_are_written() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&text_frame("abc")).unwrap();
        assert_eq!(presenter.present(&text_frame("axc")).unwrap(), 1);
    }

    #[test]
    fn invalidate_forces_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&text_frame("abc")).unwrap();
        presenter.invalidate();
        assert_eq!(presenter.present(&text_frame("abc")).unwrap(), 8);
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&text_frame("abc")).unwrap();
        assert_eq!(presenter.present(&Frame::new(2, 2)).unwrap(), 4);
    }

    #[test]
    fn colors_are_emitted_as_truecolor() {
        let mut frame = Frame::new(1, 1);
        frame
            .buffer
            .set(0, 0, Cell::from_char('x').with_fg(PackedRgba::rgb(1, 2, 3)));
        let mut presenter = Presenter::new(Vec::new());
        presenter.present(&frame).unwrap();
        assert!(output(presenter).contains("\x1b[38;2;1;2;3m"));
    }
}
