#![forbid(unsafe_code)]

//! Core: input events, geometry, logging and terminal lifecycle.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod terminal_session;

// Re-export tracing macros at crate root so call sites read the same with
// and without the feature.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, info_span, trace, warn};
