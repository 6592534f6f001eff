//! Batch mode: summarize every `.docx` in a directory.

use crate::model::Summarizer;
use crate::pipeline::{PipelineOutcome, SummaryPipeline};
use serde::Serialize;
use sog_core::{summary_file_name, Result};
use sog_parser::{DocumentParser, DocxParser};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Prefix Word gives its lock files.
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    /// Files skipped because no paragraph matched the search term.
    pub no_match: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    /// Summaries replaced by a later file with the same basename in this run.
    pub overwritten: Vec<PathBuf>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.written.len() + self.no_match.len() + self.failed.len()
    }
}

pub struct BatchJob<'a> {
    pub input_dir: PathBuf,
    /// Resolved against `input_dir` unless absolute.
    pub output_subdir: PathBuf,
    pub pipeline: SummaryPipeline,
    pub parser: DocxParser,
    pub model: &'a dyn Summarizer,
}

impl<'a> BatchJob<'a> {
    pub fn output_dir(&self) -> PathBuf {
        self.input_dir.join(&self.output_subdir)
    }

    /// Process every document. Per-file failures are recorded, not returned.
    pub async fn run(&self) -> Result<BatchReport> {
        let out_dir = self.output_dir();
        std::fs::create_dir_all(&out_dir)?;
        let files = list_documents(&self.input_dir, &self.parser)?;
        info!(input = %self.input_dir.display(), output = %out_dir.display(), files = files.len(), "batch started");

        let mut report = BatchReport { output_dir: out_dir.clone(), ..Default::default() };
        for path in files {
            match self.process(&path, &out_dir).await {
                Ok(Some(written)) => {
                    info!(file = %path.display(), summary = %written.display(), "summary written");
                    if report.written.contains(&written) {
                        report.overwritten.push(written.clone());
                    }
                    report.written.push(written);
                }
                Ok(None) => report.no_match.push(path),
                Err(e) => {
                    error!(file = %path.display(), error = %e, "failed to summarize document");
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        info!(
            written = report.written.len(),
            no_match = report.no_match.len(),
            failed = report.failed.len(),
            "batch finished"
        );
        Ok(report)
    }

    async fn process(&self, path: &Path, out_dir: &Path) -> Result<Option<PathBuf>> {
        let doc = self.parser.parse_file(path)?;
        match self.pipeline.run(self.model, &doc.text()).await? {
            PipelineOutcome::Summarized { report, .. } => {
                let target = out_dir.join(summary_file_name(&doc.name));
                if target.exists() {
                    warn!(file = %path.display(), summary = %target.display(), "overwriting existing summary");
                }
                std::fs::write(&target, report.summary)?;
                Ok(Some(target))
            }
            PipelineOutcome::Halted { halt, .. } => {
                warn!(file = %path.display(), "{}", halt.message());
                Ok(None)
            }
        }
    }
}

/// Parseable documents directly inside `dir`, sorted by name.
pub fn list_documents(dir: &Path, parser: &dyn DocumentParser) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.starts_with(LOCK_FILE_PREFIX) || !parser.can_parse(name) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
