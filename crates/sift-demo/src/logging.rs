#![forbid(unsafe_code)]

//! Log setup. The terminal belongs to the UI, so logs only go to a file.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directives used when `SIFT_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Env var holding `EnvFilter` directives.
pub const FILTER_ENV: &str = "SIFT_LOG";

pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a fmt subscriber appending to `path`.
///
/// # Errors
///
/// Fails when the file cannot be opened or a global subscriber is already
/// set.
pub fn init(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let directives = std::env::var(FILTER_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_filter_when_unset_or_invalid() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            filter_from(Some("sift=loudest")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn directives_are_kept() {
        let filter = filter_from(Some("sift_widgets=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
