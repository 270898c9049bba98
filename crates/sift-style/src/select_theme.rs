#![forbid(unsafe_code)]

//! Color presets for the searchable select.

use crate::Style;
use sift_render::cell::PackedRgba;
use std::env;

/// Styles for every part of a searchable select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectTheme {
    /// The closed display box.
    pub display: Style,
    /// The display box while it shows the placeholder.
    pub placeholder: Style,
    /// Borders of the box and the dropdown.
    pub border: Style,
    /// Border while the dropdown is open.
    pub border_focused: Style,
    /// Search field text.
    pub input: Style,
    /// Search field placeholder.
    pub input_placeholder: Style,
    /// A list row.
    pub item: Style,
    /// The highlighted list row.
    pub item_highlighted: Style,
    /// The row holding the current selection.
    pub item_selected: Style,
    /// Row icon.
    pub icon: Style,
    /// "Not found" message.
    pub empty: Style,
    pub scrollbar_track: Style,
    pub scrollbar_thumb: Style,
}

impl Default for SelectTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl SelectTheme {
    pub fn dark() -> Self {
        Self {
            display: Style::new().fg(PackedRgba::rgb(220, 220, 230)),
            placeholder: Style::new().fg(PackedRgba::rgb(130, 130, 150)),
            border: Style::new().fg(PackedRgba::rgb(100, 100, 120)),
            border_focused: Style::new().fg(PackedRgba::rgb(100, 180, 255)),
            input: Style::new().fg(PackedRgba::rgb(220, 220, 230)),
            input_placeholder: Style::new().fg(PackedRgba::rgb(110, 110, 130)),
            item: Style::new().fg(PackedRgba::rgb(190, 190, 200)),
            item_highlighted: Style::new()
                .fg(PackedRgba::rgb(255, 255, 255))
                .bg(PackedRgba::rgb(50, 50, 75)),
            item_selected: Style::new().fg(PackedRgba::rgb(255, 210, 60)),
            icon: Style::new().fg(PackedRgba::rgb(97, 218, 251)),
            empty: Style::new().fg(PackedRgba::rgb(140, 140, 160)).italic(),
            scrollbar_track: Style::new().fg(PackedRgba::rgb(60, 60, 75)),
            scrollbar_thumb: Style::new().fg(PackedRgba::rgb(150, 150, 170)),
        }
    }

    pub fn light() -> Self {
        Self {
            display: Style::new().fg(PackedRgba::rgb(30, 30, 40)),
            placeholder: Style::new().fg(PackedRgba::rgb(120, 120, 130)),
            border: Style::new().fg(PackedRgba::rgb(160, 160, 175)),
            border_focused: Style::new().fg(PackedRgba::rgb(20, 100, 200)),
            input: Style::new().fg(PackedRgba::rgb(30, 30, 40)),
            input_placeholder: Style::new().fg(PackedRgba::rgb(140, 140, 150)),
            item: Style::new().fg(PackedRgba::rgb(50, 50, 60)),
            item_highlighted: Style::new()
                .fg(PackedRgba::rgb(0, 0, 0))
                .bg(PackedRgba::rgb(200, 215, 240)),
            item_selected: Style::new().fg(PackedRgba::rgb(150, 90, 0)),
            icon: Style::new().fg(PackedRgba::rgb(20, 130, 170)),
            empty: Style::new().fg(PackedRgba::rgb(110, 110, 120)).italic(),
            scrollbar_track: Style::new().fg(PackedRgba::rgb(210, 210, 220)),
            scrollbar_thumb: Style::new().fg(PackedRgba::rgb(120, 120, 135)),
        }
    }

    /// Pick the dark or light preset from `COLORFGBG`, defaulting to dark.
    pub fn detect() -> Self {
        if prefers_dark(env::var("COLORFGBG").ok().as_deref()) {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

/// `COLORFGBG` is `fg;bg` in ANSI indices; 7 and 15 are light backgrounds.
fn prefers_dark(colorfgbg: Option<&str>) -> bool {
    if let Some(value) = colorfgbg
        && let Some(bg) = value.split(';').next_back()
        && let Ok(bg) = bg.trim().parse::<u8>()
    {
        return bg != 7 && bg != 15;
    }
    true
}
