//! Case-insensitive paragraph filter.

use serde::Serialize;

/// Result of filtering a document string by a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FilterOutcome {
    /// No term given; text passed through untouched.
    Unfiltered { text: String },
    /// Paragraphs containing the term, newline-joined.
    Matched { text: String, paragraphs: usize },
    /// The term appears in no paragraph.
    NoMatch { term: String },
}

impl FilterOutcome {
    /// Text to continue with, `None` on no match.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Unfiltered { text } | Self::Matched { text, .. } => Some(text.as_str()),
            Self::NoMatch { .. } => None,
        }
    }
}

/// An absent or empty term means "no filter". Any other term is matched as
/// given, surrounding whitespace included.
pub fn normalize_term(term: Option<&str>) -> Option<&str> {
    term.filter(|t| !t.is_empty())
}

/// Keep only paragraphs (split on `\n`) containing `term`, ignoring case.
pub fn filter_paragraphs(text: &str, term: Option<&str>) -> FilterOutcome {
    let Some(term) = normalize_term(term) else {
        return FilterOutcome::Unfiltered { text: text.to_string() };
    };

    let needle = term.to_lowercase();
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|p| p.to_lowercase().contains(&needle))
        .collect();

    if kept.is_empty() {
        return FilterOutcome::NoMatch { term: term.to_string() };
    }
    FilterOutcome::Matched { paragraphs: kept.len(), text: kept.join("\n") }
}
