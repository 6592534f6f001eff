use sog_core::{Document, Result, SogError};
use std::path::Path;

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Parse raw file contents. `name` is the original file name.
    fn parse_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document>;

    /// Parse from file path. Unsupported extensions are rejected before reading.
    fn parse_file(&self, path: &Path) -> Result<Document> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.ensure_supported(name)?;
        let bytes = std::fs::read(path)?;
        self.parse_bytes(name, &bytes)
    }

    /// Supported file extensions.
    fn supported_extensions(&self) -> Vec<String>;

    /// Check if a file can be parsed.
    fn can_parse(&self, path: &str) -> bool {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let ext_with_dot = format!(".{}", ext.to_lowercase());
        self.supported_extensions().contains(&ext_with_dot)
    }

    /// `InvalidInput` unless [`can_parse`](Self::can_parse) accepts `name`.
    fn ensure_supported(&self, name: &str) -> Result<()> {
        if self.can_parse(name) {
            return Ok(());
        }
        Err(SogError::InvalidInput(format!(
            "Please upload a {} file (got '{}')",
            self.supported_extensions().join(", ").trim_start_matches('.').to_uppercase(),
            name
        )))
    }
}
