#![forbid(unsafe_code)]

//! The unit of the render grid.
//!
//! A [`Cell`] is one terminal column on one row: a character, two colors and a
//! set of style flags. Wide characters occupy a head cell followed by
//! [`CellContent::CONTINUATION`] cells that the presenter never writes.

use unicode_width::UnicodeWidthChar;

/// Cell content: a scalar value, empty, or the tail of a wide character.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellContent(u32);

impl CellContent {
    /// Nothing drawn. Presented as a space.
    pub const EMPTY: Self = Self(0);

    /// Covered by the wide character to the left.
    pub const CONTINUATION: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self(c as u32)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    #[inline]
    pub const fn is_continuation(self) -> bool {
        self.0 == Self::CONTINUATION.0
    }

    /// The character stored here, if any.
    pub fn as_char(self) -> Option<char> {
        if self.is_empty() || self.is_continuation() {
            None
        } else {
            char::from_u32(self.0)
        }
    }

    /// Display width in columns. Empty cells count as one column.
    pub fn width(self) -> usize {
        if self.is_continuation() {
            return 0;
        }
        match self.as_char() {
            Some(c) => c.width().unwrap_or(0),
            None => 1,
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::fmt::Debug for CellContent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            f.write_str("Empty")
        } else if self.is_continuation() {
            f.write_str("Continuation")
        } else {
            match self.as_char() {
                Some(c) => write!(f, "Char({c:?})"),
                None => write!(f, "Invalid({:#x})", self.0),
            }
        }
    }
}

/// RGBA color packed as `0xRRGGBBAA`.
///
/// Alpha 0 ([`PackedRgba::TRANSPARENT`]) means "terminal default" for the
/// presenter and "keep what is underneath" when compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Place `self` over `dst`. Only fully transparent sources let `dst` through.
    #[inline]
    pub const fn over(self, dst: Self) -> Self {
        if self.a() == 0 { dst } else { self }
    }
}

bitflags::bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// One grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub content: CellContent,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub attrs: StyleFlags,
}

impl Cell {
    /// The tail of a wide character.
    pub const CONTINUATION: Self = Self {
        content: CellContent::CONTINUATION,
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        attrs: StyleFlags::empty(),
    };

    #[inline]
    pub const fn new(content: CellContent) -> Self {
        Self {
            content,
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            attrs: StyleFlags::empty(),
        }
    }

    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self::new(CellContent::from_char(c))
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.content.is_continuation()
    }

    #[inline]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    #[inline]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    pub const fn with_attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs = attrs;
        self
    }
}

impl core::fmt::Debug for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cell")
            .field("content", &self.content)
            .field("fg", &format_args!("{:#010x}", self.fg.0))
            .field("bg", &format_args!("{:#010x}", self.bg.0))
            .field("attrs", &self.attrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn content_widths() {
        assert_eq!(CellContent::from_char('a').width(), 1);
        assert_eq!(CellContent::from_char('界').width(), 2);
        assert_eq!(CellContent::EMPTY.width(), 1);
        assert_eq!(CellContent::CONTINUATION.width(), 0);
    }

    #[test]
    fn special_contents_have_no_char() {
        assert_eq!(CellContent::EMPTY.as_char(), None);
        assert_eq!(CellContent::CONTINUATION.as_char(), None);
        assert_eq!(CellContent::from_char('x').as_char(), Some('x'));
    }

    #[test]
    fn transparent_source_keeps_destination() {
        let red = PackedRgba::rgb(255, 0, 0);
        assert_eq!(PackedRgba::TRANSPARENT.over(red), red);
        assert_eq!(PackedRgba::WHITE.over(red), PackedRgba::WHITE);
    }

    #[test]
    fn default_cell_is_empty_and_unstyled() {
        let cell = Cell::default();
        assert!(cell.content.is_empty());
        assert_eq!(cell.fg, PackedRgba::TRANSPARENT);
        assert!(cell.attrs.is_empty());
    }

    proptest! {
        #[test]
        fn rgba_channels_round_trip(r: u8, g: u8, b: u8, a: u8) {
            let c = PackedRgba::rgba(r, g, b, a);
            prop_assert_eq!((c.r(), c.g(), c.b(), c.a()), (r, g, b, a));
        }
    }
}
