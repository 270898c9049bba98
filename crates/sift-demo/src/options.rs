#![forbid(unsafe_code)]

//! Where the options come from: generated `Option 1..Option N`, or a JSON
//! file.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use sift_widgets::SelectOption;

#[derive(Debug)]
pub enum OptionsError {
    Io(io::Error),
    Json(serde_json::Error),
    /// The file parsed but held no options.
    Empty,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read options file: {e}"),
            Self::Json(e) => write!(f, "invalid options file: {e}"),
            Self::Empty => write!(f, "options file has no options"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Empty => None,
        }
    }
}

impl From<io::Error> for OptionsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for OptionsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// One array element: a full option record or a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Record(SelectOption),
    Text(String),
}

impl From<Entry> for SelectOption {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Record(option) => option,
            Entry::Text(text) => SelectOption::new(text),
        }
    }
}

/// `Option 1` through `Option count`.
pub fn numbered(count: usize) -> Vec<SelectOption> {
    (1..=count)
        .map(|i| SelectOption::new(format!("Option {i}")))
        .collect()
}

/// Parse a JSON array of `{"text": ...}` records or strings.
pub fn parse_options(json: &str) -> Result<Vec<SelectOption>, OptionsError> {
    let entries: Vec<Entry> = serde_json::from_str(json)?;
    if entries.is_empty() {
        return Err(OptionsError::Empty);
    }
    Ok(entries.into_iter().map(SelectOption::from).collect())
}

pub fn load_options(path: &Path) -> Result<Vec<SelectOption>, OptionsError> {
    let json = fs::read_to_string(path)?;
    let options = parse_options(&json)?;
    tracing::info!(path = %path.display(), count = options.len(), "options loaded");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(options: &[SelectOption]) -> Vec<&str> {
        options.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn numbered_starts_at_one() {
        let options = numbered(3);
        assert_eq!(texts(&options), ["Option 1", "Option 2", "Option 3"]);
        assert!(numbered(0).is_empty());
    }

    #[test]
    fn records_and_strings_mix() {
        let options = parse_options(r#"[{"text": "Apple"}, "Banana", {"text": "Çà"}]"#).unwrap();
        assert_eq!(texts(&options), ["Apple", "Banana", "Çà"]);
    }

    #[test]
    fn empty_array_is_an_error() {
        assert!(matches!(parse_options("[]"), Err(OptionsError::Empty)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_options(r#"{"text": "not an array"}"#).unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));
        assert!(err.to_string().starts_with("invalid options file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_options(Path::new("/nonexistent/sift/options.json")).unwrap_err();
        assert!(matches!(err, OptionsError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }
}
