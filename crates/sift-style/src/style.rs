#![forbid(unsafe_code)]

use sift_render::cell::{Cell, PackedRgba, StyleFlags};

/// A partial cell style. `None` fields leave the cell's value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub attrs: Option<StyleFlags>,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add attribute flags to whatever is already set.
    #[must_use]
    pub fn add(mut self, flags: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flags);
        self
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.add(StyleFlags::BOLD)
    }

    #[must_use]
    pub fn dim(self) -> Self {
        self.add(StyleFlags::DIM)
    }

    #[must_use]
    pub fn italic(self) -> Self {
        self.add(StyleFlags::ITALIC)
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        self.add(StyleFlags::REVERSE)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Layer `other` on top: its set fields win, attributes are unioned.
    #[must_use]
    pub fn patch(self, other: Style) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: match (self.attrs, other.attrs) {
                (Some(a), Some(b)) => Some(a | b),
                (a, b) => b.or(a),
            },
        }
    }

    /// Write the set fields into `cell`. Attributes are added, not replaced.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(attrs) = self.attrs {
            cell.attrs |= attrs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_is_empty() {
        assert!(Style::new().is_empty());
        assert!(!Style::new().bold().is_empty());
    }

    #[test]
    fn builders_accumulate_attrs() {
        let style = Style::new().bold().reverse();
        assert_eq!(style.attrs, Some(StyleFlags::BOLD | StyleFlags::REVERSE));
    }

    #[test]
    fn apply_keeps_unset_fields() {
        let mut cell = Cell::from_char('a').with_bg(PackedRgba::BLACK);
        Style::new().fg(PackedRgba::WHITE).apply_to(&mut cell);
        assert_eq!(cell.fg, PackedRgba::WHITE);
        assert_eq!(cell.bg, PackedRgba::BLACK);
        assert_eq!(cell.content.as_char(), Some('a'));
    }

    #[test]
    fn patch_prefers_overlay() {
        let base = Style::new().fg(PackedRgba::BLACK).bg(PackedRgba::BLACK).dim();
        let top = Style::new().fg(PackedRgba::WHITE).bold();
        let merged = base.patch(top);
        assert_eq!(merged.fg, Some(PackedRgba::WHITE));
        assert_eq!(merged.bg, Some(PackedRgba::BLACK));
        assert_eq!(merged.attrs, Some(StyleFlags::DIM | StyleFlags::BOLD));
    }

    fn style() -> impl Strategy<Value = Style> {
        (
            proptest::option::of(any::<u32>()),
            proptest::option::of(any::<u32>()),
            proptest::option::of(0u8..32),
        )
            .prop_map(|(fg, bg, attrs)| Style {
                fg: fg.map(PackedRgba),
                bg: bg.map(PackedRgba),
                attrs: attrs.map(StyleFlags::from_bits_truncate),
            })
    }

    proptest! {
        #[test]
        fn patch_with_empty_is_identity(s in style()) {
            prop_assert_eq!(s.patch(Style::new()), s);
            prop_assert_eq!(Style::new().patch(s), s);
        }
    }
}
