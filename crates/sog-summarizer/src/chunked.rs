//! Chunk-and-summarize: fixed windows in, blank-line-joined summaries out.

use crate::model::Summarizer;
use serde::Serialize;
use sog_core::config::{DecodingParams, SogConfig};
use sog_core::{Result, NO_TEXT_MESSAGE};
use sog_parser::CharChunker;
use tracing::{debug, info};

/// Separator between per-chunk summaries.
pub const SUMMARY_SEPARATOR: &str = "\n\n";

/// Summary with run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: String,
    pub chunks: usize,
    pub model: String,
    pub input_chars: usize,
}

pub struct ChunkedSummarizer {
    pub chunker: CharChunker,
    pub params: DecodingParams,
}

impl ChunkedSummarizer {
    pub fn new(max_chunk_chars: usize, params: DecodingParams) -> Self {
        Self { chunker: CharChunker::new(max_chunk_chars), params }
    }

    pub fn from_config(config: &SogConfig) -> Self {
        Self::new(config.chunking.max_chunk_chars, config.decoding.clone())
    }

    /// Summarize `text` one chunk at a time, in order.
    ///
    /// Empty input returns [`NO_TEXT_MESSAGE`] without touching the model.
    /// Any failed chunk fails the whole call.
    pub async fn summarize(&self, model: &dyn Summarizer, text: &str) -> Result<SummaryReport> {
        if text.is_empty() {
            return Ok(SummaryReport {
                summary: NO_TEXT_MESSAGE.to_string(),
                chunks: 0,
                model: model.model_name().to_string(),
                input_chars: 0,
            });
        }

        let chunks = self.chunker.chunk(text);
        let total = chunks.len();
        info!(chunks = total, max_chars = self.chunker.max_chars, model = model.model_name(), "summarizing");

        let mut summaries = Vec::with_capacity(total);
        for chunk in &chunks {
            debug!(index = chunk.index, total, chars = chunk.char_len(), "summarizing chunk");
            summaries.push(model.summarize(&chunk.text, &self.params).await?);
        }

        Ok(SummaryReport {
            summary: summaries.join(SUMMARY_SEPARATOR),
            chunks: total,
            model: model.model_name().to_string(),
            input_chars: chunks.last().map(|c| c.end).unwrap_or(0),
        })
    }
}

impl Default for ChunkedSummarizer {
    fn default() -> Self {
        Self::new(1024, DecodingParams::default())
    }
}
