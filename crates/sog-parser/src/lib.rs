//! Document parsing for the SOG summarizer.
//!
//! Turns `.docx` files into paragraph lists, filters paragraphs by a search
//! term and splits document strings into fixed-size character windows.

pub mod chunker;
pub mod docx;
pub mod filter;
pub mod traits;

pub use chunker::{CharChunker, Chunk};
pub use docx::DocxParser;
pub use filter::{filter_paragraphs, FilterOutcome};
pub use traits::DocumentParser;
