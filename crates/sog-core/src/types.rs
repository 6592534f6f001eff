use serde::{Deserialize, Serialize};

/// Returned in place of a summary when there is no text to feed the model.
pub const NO_TEXT_MESSAGE: &str = "No text to summarize.";

/// Fallback basename when an upload name has nothing usable before its extension.
const DEFAULT_BASENAME: &str = "document";

/// Paragraphs extracted from a single source file.
///
/// Every paragraph is trimmed and non-empty. The document string handed to
/// the rest of the pipeline is the paragraphs joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    paragraphs: Vec<String>,
}

impl Document {
    /// Build a document, trimming paragraphs and dropping blank ones.
    ///
    /// Embedded newlines split a paragraph in two, so the joined text never
    /// holds a blank line.
    pub fn new<I, S>(name: impl Into<String>, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paragraphs = paragraphs
            .into_iter()
            .flat_map(|p| {
                p.as_ref()
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { name: name.into(), paragraphs }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// The newline-joined document string.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    /// Approximate word count (whitespace-separated tokens).
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.split_whitespace().count()).sum()
    }

    /// Name of the summary file for this document.
    pub fn summary_file_name(&self) -> String {
        summary_file_name(&self.name)
    }
}

/// `<basename>_summary.txt` for an uploaded or on-disk file name.
///
/// Directory components are dropped and the basename ends at the first `.`,
/// so `reports/q3.final.docx` becomes `q3_summary.txt`.
pub fn summary_file_name(file_name: &str) -> String {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let base = last.split('.').next().unwrap_or("").trim();
    let base = if base.is_empty() { DEFAULT_BASENAME } else { base };
    format!("{}_summary.txt", base)
}
