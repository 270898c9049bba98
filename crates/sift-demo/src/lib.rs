#![forbid(unsafe_code)]

//! The `sift` demo: one searchable select over thousands of options.

pub mod app;
pub mod cli;
pub mod logging;
pub mod options;
