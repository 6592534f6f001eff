//! SOG summarizer: chunked summarization over a pretrained model.
//!
//! - `model`: the [`Summarizer`] trait and its backends
//! - `cache`: lazily loaded, process-wide model handle
//! - `chunked`: fixed-window chunking and per-chunk summarization
//! - `pipeline`: optional text stages (search filter) before summarizing
//! - `batch`: directory-at-a-time summarization

pub mod batch;
pub mod cache;
pub mod chunked;
pub mod model;
pub mod pipeline;

pub use batch::{BatchJob, BatchReport};
pub use cache::ModelCache;
pub use chunked::{ChunkedSummarizer, SummaryReport};
pub use model::{load_summarizer, InferenceSummarizer, LeadSummarizer, Summarizer};
pub use pipeline::{FilterStage, Halt, PipelineOutcome, SummaryPipeline, TextStage};
