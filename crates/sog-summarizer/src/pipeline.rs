//! Summary pipeline: ordered text stages followed by the chunked summarizer.

use crate::chunked::{ChunkedSummarizer, SummaryReport};
use crate::model::Summarizer;
use serde::Serialize;
use sog_core::{Result, SogConfig};
use sog_parser::filter::{filter_paragraphs, normalize_term, FilterOutcome};
use tracing::{info, warn};

/// Why a pipeline stopped before summarizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Halt {
    NoMatch { term: String },
}

impl Halt {
    /// Warning shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::NoMatch { term } => format!("No content found containing '{}'", term),
        }
    }
}

pub enum StageOutcome {
    Continue(String),
    Halt(Halt),
}

/// A pure text-to-text transformation applied before summarization.
pub trait TextStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, text: String) -> StageOutcome;
}

/// Keeps paragraphs containing a search term.
pub struct FilterStage {
    pub term: String,
}

impl FilterStage {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }
}

impl TextStage for FilterStage {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, text: String) -> StageOutcome {
        match filter_paragraphs(&text, Some(&self.term)) {
            FilterOutcome::NoMatch { term } => {
                warn!(term = %term, "no paragraphs matched search term");
                StageOutcome::Halt(Halt::NoMatch { term })
            }
            FilterOutcome::Matched { text, paragraphs } => {
                info!(term = %self.term, paragraphs, "filtered paragraphs");
                StageOutcome::Continue(text)
            }
            FilterOutcome::Unfiltered { text } => StageOutcome::Continue(text),
        }
    }
}

/// Text after the pre-summary stages, or the reason they stopped.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub outcome: std::result::Result<String, Halt>,
    pub stages_applied: Vec<String>,
}

impl Prepared {
    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Summarized {
        text: String,
        report: SummaryReport,
        stages_applied: Vec<String>,
    },
    Halted {
        halt: Halt,
        stages_applied: Vec<String>,
    },
}

pub struct SummaryPipeline {
    stages: Vec<Box<dyn TextStage>>,
    summarizer: ChunkedSummarizer,
}

impl SummaryPipeline {
    pub fn new(summarizer: ChunkedSummarizer) -> Self {
        Self { stages: Vec::new(), summarizer }
    }

    pub fn from_config(config: &SogConfig) -> Self {
        Self::new(ChunkedSummarizer::from_config(config))
    }

    pub fn with_stage(mut self, stage: impl TextStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add the filter stage when `enabled` and the term is not empty.
    pub fn with_filter(self, enabled: bool, term: Option<&str>) -> Self {
        match normalize_term(term) {
            Some(term) if enabled => self.with_stage(FilterStage::new(term)),
            _ => self,
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn summarizer(&self) -> &ChunkedSummarizer {
        &self.summarizer
    }

    /// Run the text stages only.
    pub fn prepare(&self, text: &str) -> Prepared {
        let mut current = text.to_string();
        let mut applied = Vec::new();
        for stage in &self.stages {
            applied.push(stage.name().to_string());
            match stage.apply(current) {
                StageOutcome::Continue(next) => current = next,
                StageOutcome::Halt(halt) => {
                    return Prepared { outcome: Err(halt), stages_applied: applied };
                }
            }
        }
        Prepared { outcome: Ok(current), stages_applied: applied }
    }

    /// Run the stages, then summarize what is left.
    pub async fn run(&self, model: &dyn Summarizer, text: &str) -> Result<PipelineOutcome> {
        let Prepared { outcome, stages_applied } = self.prepare(text);
        match outcome {
            Ok(text) => {
                let report = self.summarizer.summarize(model, &text).await?;
                Ok(PipelineOutcome::Summarized { text, report, stages_applied })
            }
            Err(halt) => Ok(PipelineOutcome::Halted { halt, stages_applied }),
        }
    }
}
