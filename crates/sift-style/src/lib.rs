#![forbid(unsafe_code)]

//! Styles and themes.

pub mod select_theme;
mod style;

pub use select_theme::SelectTheme;
pub use style::Style;
