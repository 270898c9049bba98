#![forbid(unsafe_code)]

//! Options and the case-insensitive substring filter.

/// One selectable item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectOption {
    pub text: String,
}

impl SelectOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for SelectOption {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SelectOption {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Indices of the options whose lowercased text contains the lowercased
/// `query`, in their original order. An empty query keeps everything.
pub fn filter_indices(options: &[SelectOption], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..options.len()).collect();
    }
    let needle = query.to_lowercase();
    options
        .iter()
        .enumerate()
        .filter(|(_, option)| option.text.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}
