//! Word (`.docx`) parser.

use crate::traits::DocumentParser;
use docx_rs::{Break, BreakType, DocumentChild, ParagraphChild, RunChild};
use sog_core::{Document, Result, SogError};
use tracing::debug;

/// Extracts body paragraphs from Office Open XML documents.
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self { Self }
}

impl DocumentParser for DocxParser {
    fn parse_bytes(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        let docx = docx_rs::read_docx(bytes)
            .map_err(|e| SogError::Parse(format!("{}: {}", name, e)))?;

        let mut paragraphs = Vec::new();
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(p) = child {
                let mut lines = vec![String::new()];
                collect_text(&p.children, &mut lines);
                paragraphs.extend(lines);
            }
        }

        let doc = Document::new(name, paragraphs);
        debug!(name, paragraphs = doc.paragraph_count(), "parsed docx");
        Ok(doc)
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![".docx".into()]
    }
}

impl Default for DocxParser {
    fn default() -> Self { Self::new() }
}

/// Append run text to the last line. A line break starts a new line so
/// `Document::new` can drop the blank ones; page and column breaks add nothing.
fn collect_text(children: &[ParagraphChild], lines: &mut Vec<String>) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => push_str(lines, &t.text),
                        RunChild::Tab(_) => push_str(lines, "\t"),
                        RunChild::Break(br) if is_line_break(br) => lines.push(String::new()),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_text(&link.children, lines),
            _ => {}
        }
    }
}

/// Anything but a page or column break, including `<w:br w:clear=".."/>`.
fn is_line_break(br: &Break) -> bool {
    *br != Break::new(BreakType::Page) && *br != Break::new(BreakType::Column)
}

fn push_str(lines: &mut Vec<String>, s: &str) {
    match lines.last_mut() {
        Some(line) => line.push_str(s),
        None => lines.push(s.to_string()),
    }
}
