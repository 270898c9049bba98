#![forbid(unsafe_code)]

//! Single-line text input.
//!
//! The cursor is a grapheme index, so combining sequences and wide characters
//! are edited as one unit. The visible window scrolls horizontally to keep
//! the cursor on screen. Only a focused input reacts to events and places
//! the hardware cursor.

use sift_core::event::{Event, KeyCode, KeyEvent};
use sift_core::geometry::Rect;
use sift_render::cell::{Cell, StyleFlags};
use sift_render::frame::Frame;
use sift_style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::Widget;

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position as a grapheme index into `value`.
    cursor: usize,
    placeholder: String,
    /// Maximum length in graphemes.
    max_length: Option<usize>,
    style: Style,
    cursor_style: Style,
    placeholder_style: Style,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.grapheme_count();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Style for the cell under the cursor. Empty means reverse video.
    pub fn with_cursor_style(mut self, style: Style) -> Self {
        self.cursor_style = style;
        self
    }

    pub fn with_placeholder_style(mut self, style: Style) -> Self {
        self.placeholder_style = style;
        self
    }

    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Screen position of the cursor when rendered into `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let rel_x = self
            .cursor_visual_pos()
            .saturating_sub(self.effective_scroll(area.width as usize));
        let x = area
            .x
            .saturating_add(rel_x as u16)
            .min(area.right().saturating_sub(1));
        (x, area.y)
    }

    /// Apply an input event. Returns `true` if the value or cursor changed.
    ///
    /// Unfocused inputs ignore everything.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if !self.focused {
            return false;
        }
        match event {
            Event::Key(key) if key.is_actionable() => self.handle_key(key),
            Event::Paste(paste) => self.insert_str(&paste.text),
            _ => false,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.ctrl();
        match key.code {
            KeyCode::Char('u') if ctrl => {
                let end = self.grapheme_byte_offset(self.cursor);
                self.value.drain(..end);
                let moved = self.cursor > 0;
                self.cursor = 0;
                moved
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(c) if !ctrl && !key.alt() => self.insert_char(c),
            KeyCode::Backspace if ctrl => self.delete_word_back(),
            KeyCode::Backspace => self.delete_char_back(),
            KeyCode::Delete => self.delete_char_forward(),
            KeyCode::Left if ctrl => self.move_to(self.word_start_before(self.cursor)),
            KeyCode::Left => self.move_to(self.cursor.saturating_sub(1)),
            KeyCode::Right if ctrl => self.move_to(self.word_end_after(self.cursor)),
            KeyCode::Right => self.move_to((self.cursor + 1).min(self.grapheme_count())),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.grapheme_count()),
            _ => false,
        }
    }

    fn move_to(&mut self, cursor: usize) -> bool {
        let changed = cursor != self.cursor;
        self.cursor = cursor;
        changed
    }

    fn insert_char(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        if let Some(max) = self.max_length
            && self.grapheme_count() >= max
        {
            return false;
        }
        let before = self.grapheme_count();
        let offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert(offset, c);
        // A combining mark can merge into the previous grapheme.
        if self.grapheme_count() > before {
            self.cursor += 1;
        }
        true
    }

    /// Insert pasted text with line breaks and other controls dropped.
    fn insert_str(&mut self, text: &str) -> bool {
        let mut changed = false;
        for c in text.chars() {
            changed |= self.insert_char(c);
        }
        changed
    }

    fn delete_char_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.grapheme_byte_offset(self.cursor - 1);
        let end = self.grapheme_byte_offset(self.cursor);
        self.value.drain(start..end);
        self.cursor -= 1;
        true
    }

    fn delete_char_forward(&mut self) -> bool {
        if self.cursor >= self.grapheme_count() {
            return false;
        }
        let start = self.grapheme_byte_offset(self.cursor);
        let end = self.grapheme_byte_offset(self.cursor + 1);
        self.value.drain(start..end);
        true
    }

    fn delete_word_back(&mut self) -> bool {
        let start = self.word_start_before(self.cursor);
        if start == self.cursor {
            return false;
        }
        let byte_start = self.grapheme_byte_offset(start);
        let byte_end = self.grapheme_byte_offset(self.cursor);
        self.value.drain(byte_start..byte_end);
        self.cursor = start;
        true
    }

    /// Start of the run of same-class graphemes ending at `pos`, after
    /// skipping any whitespace directly before `pos`.
    fn word_start_before(&self, pos: usize) -> usize {
        let graphemes: Vec<&str> = self.value.graphemes(true).collect();
        let mut pos = pos.min(graphemes.len());
        while pos > 0 && class_of(graphemes[pos - 1]) == CharClass::Space {
            pos -= 1;
        }
        if pos == 0 {
            return 0;
        }
        let class = class_of(graphemes[pos - 1]);
        while pos > 0 && class_of(graphemes[pos - 1]) == class {
            pos -= 1;
        }
        pos
    }

    fn word_end_after(&self, pos: usize) -> usize {
        let graphemes: Vec<&str> = self.value.graphemes(true).collect();
        let max = graphemes.len();
        let mut pos = pos.min(max);
        while pos < max && class_of(graphemes[pos]) == CharClass::Space {
            pos += 1;
        }
        if pos == max {
            return max;
        }
        let class = class_of(graphemes[pos]);
        while pos < max && class_of(graphemes[pos]) == class {
            pos += 1;
        }
        pos
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn cursor_visual_pos(&self) -> usize {
        self.value
            .graphemes(true)
            .take(self.cursor)
            .map(UnicodeWidthStr::width)
            .sum()
    }

    /// Leftmost visible column so that the cursor stays in the viewport.
    fn effective_scroll(&self, viewport_width: usize) -> usize {
        let cursor = self.cursor_visual_pos();
        if viewport_width == 0 {
            return cursor;
        }
        (cursor + 1).saturating_sub(viewport_width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Word,
    Punct,
}

fn class_of(grapheme: &str) -> CharClass {
    if grapheme.chars().all(char::is_whitespace) {
        CharClass::Space
    } else if grapheme.chars().any(char::is_alphanumeric) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

impl Widget for TextInput {
    fn render(&self, area: Rect, frame: &mut Frame) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "TextInput",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }
        crate::set_style_area(&mut frame.buffer, area, self.style);

        let y = area.y;
        let max_x = area.right();
        if self.value.is_empty() {
            crate::draw_text_span(
                &mut frame.buffer,
                area.x,
                y,
                &self.placeholder,
                self.placeholder_style,
                max_x,
            );
        } else {
            let scroll = self.effective_scroll(area.width as usize);
            let mut visual_x = 0usize;
            for g in self.value.graphemes(true) {
                let w = UnicodeWidthStr::width(g);
                if visual_x < scroll {
                    visual_x += w;
                    continue;
                }
                let rel_x = visual_x - scroll;
                if rel_x + w > area.width as usize {
                    break;
                }
                if let Some(c) = g.chars().next() {
                    let mut cell = Cell::from_char(c);
                    crate::apply_style(&mut cell, self.style);
                    frame.buffer.set(area.x + rel_x as u16, y, cell);
                }
                visual_x += w;
            }
        }

        if !self.focused {
            return;
        }
        let (cursor_x, cursor_y) = self.cursor_position(area);
        if let Some(cell) = frame.buffer.get_mut(cursor_x, cursor_y) {
            if self.cursor_style.is_empty() {
                cell.attrs ^= StyleFlags::REVERSE;
            } else {
                crate::apply_style(cell, self.cursor_style);
            }
        }
        frame.set_cursor(Some((cursor_x, cursor_y)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::event::{Modifiers, PasteEvent};

    fn focused() -> TextInput {
        TextInput::new().with_focused(true)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn ctrl(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code).with_modifiers(Modifiers::CTRL))
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.handle_event(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = focused();
        type_str(&mut input, "ac");
        input.handle_event(&key(KeyCode::Left));
        type_str(&mut input, "b");
        assert_eq!(input.value(), "abc");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn unfocused_ignores_events() {
        let mut input = TextInput::new();
        assert!(!input.handle_event(&key(KeyCode::Char('x'))));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = focused().with_value("hello");
        assert!(input.handle_event(&key(KeyCode::Backspace)));
        assert_eq!(input.value(), "hell");
        input.handle_event(&key(KeyCode::Home));
        assert!(input.handle_event(&key(KeyCode::Delete)));
        assert_eq!(input.value(), "ell");
        assert!(!input.handle_event(&key(KeyCode::Backspace)));
    }

    #[test]
    fn ctrl_backspace_deletes_word() {
        let mut input = focused().with_value("Option 99");
        input.handle_event(&ctrl(KeyCode::Backspace));
        assert_eq!(input.value(), "Option ");
        input.handle_event(&ctrl(KeyCode::Char('w')));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn ctrl_u_clears_to_start() {
        let mut input = focused().with_value("abcdef");
        input.handle_event(&key(KeyCode::Left));
        input.handle_event(&key(KeyCode::Left));
        input.handle_event(&ctrl(KeyCode::Char('u')));
        assert_eq!(input.value(), "ef");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn word_motion() {
        let mut input = focused().with_value("foo bar.baz");
        input.handle_event(&ctrl(KeyCode::Left));
        assert_eq!(input.cursor(), 8);
        input.handle_event(&ctrl(KeyCode::Left));
        assert_eq!(input.cursor(), 7);
        input.handle_event(&key(KeyCode::Home));
        input.handle_event(&ctrl(KeyCode::Right));
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn paste_drops_control_characters() {
        let mut input = focused();
        input.handle_event(&Event::Paste(PasteEvent::bracketed("99\n99\t")));
        assert_eq!(input.value(), "9999");
    }

    #[test]
    fn max_length_caps_graphemes() {
        let mut input = focused().with_max_length(3);
        type_str(&mut input, "abcdef");
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn combining_mark_edits_as_one_grapheme() {
        let mut input = focused();
        type_str(&mut input, "e\u{301}x");
        assert_eq!(input.cursor(), 2);
        input.handle_event(&key(KeyCode::Backspace));
        input.handle_event(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn ctrl_chars_are_not_inserted() {
        let mut input = focused();
        assert!(!input.handle_event(&ctrl(KeyCode::Char('x'))));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn render_placeholder_and_cursor() {
        let input = focused().with_placeholder("Search...");
        let mut frame = Frame::new(12, 1);
        input.render(Rect::new(1, 0, 10, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0), " Search...  ");
        assert_eq!(frame.cursor_position, Some((1, 0)));
    }

    #[test]
    fn render_scrolls_to_cursor() {
        let input = focused().with_value("abcdefgh");
        let mut frame = Frame::new(4, 1);
        input.render(Rect::new(0, 0, 4, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "fgh ");
        assert_eq!(frame.cursor_position, Some((3, 0)));
    }

    #[test]
    fn unfocused_render_has_no_cursor() {
        let input = TextInput::new().with_value("abc");
        let mut frame = Frame::new(5, 1);
        input.render(Rect::new(0, 0, 5, 1), &mut frame);
        assert_eq!(frame.cursor_position, None);
        assert_eq!(frame.buffer.row_text(0), "abc  ");
    }
}
