//! `sog`: document summarizer web form, batch runner and one-shot CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sog_core::config::ModelBackend;
use sog_core::{summary_file_name, SogConfig};
use sog_parser::{DocumentParser, DocxParser};
use sog_summarizer::{BatchJob, ModelCache, PipelineOutcome, SummaryPipeline};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sog", version, about = "Extract, filter and summarize DOCX documents")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, env = "SOG_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum characters per model call
    #[arg(long, global = true, env = "SOG_MAX_CHUNK_CHARS")]
    max_chunk_chars: Option<usize>,

    /// Minimum summary length (tokens)
    #[arg(long, global = true)]
    min_length: Option<usize>,

    /// Maximum summary length (tokens)
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Model backend: inference | lead
    #[arg(long, global = true, env = "SOG_BACKEND")]
    backend: Option<ModelBackend>,

    /// Summarization endpoint URL
    #[arg(long, global = true, env = "SOG_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form
    Serve {
        #[arg(long, env = "SOG_HOST")]
        host: Option<String>,
        #[arg(long, env = "SOG_PORT")]
        port: Option<u16>,
    },
    /// Summarize every .docx in a directory
    Batch {
        #[arg(long, value_name = "DIR")]
        input_dir: PathBuf,
        /// Output directory, relative to the input directory unless absolute
        #[arg(long)]
        output_subdir: Option<PathBuf>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the text extracted from a document
    Extract {
        file: PathBuf,
        /// Only print the first N characters
        #[arg(long)]
        preview: Option<usize>,
    },
    /// Summarize one document into a text file
    Summarize {
        file: PathBuf,
        /// Defaults to <basename>_summary.txt next to the input
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        search: Option<String>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<SogConfig> {
        let mut config = match &self.config {
            Some(path) => SogConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SogConfig::default(),
        };
        if let Some(n) = self.max_chunk_chars {
            config.chunking.max_chunk_chars = n;
        }
        if let Some(n) = self.min_length {
            config.decoding.min_length = n;
        }
        if let Some(n) = self.max_length {
            config.decoding.max_length = n;
        }
        if let Some(backend) = self.backend {
            config.summarizer.backend = backend;
        }
        if let Some(endpoint) = &self.endpoint {
            config.summarizer.endpoint = Some(endpoint.clone());
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = cli.load_config()?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Batch { input_dir, output_subdir, search } => {
            let model = ModelCache::new(config.summarizer.clone()).get().await?;
            let job = BatchJob {
                input_dir,
                output_subdir: output_subdir.unwrap_or_else(|| PathBuf::from(&config.batch.output_subdir)),
                pipeline: SummaryPipeline::from_config(&config).with_filter(true, search.as_deref()),
                parser: DocxParser::new(),
                model: model.as_ref(),
            };
            let report = job.run().await?;
            println!(
                "Wrote {} summaries to {} ({} without matches, {} failed)",
                report.written.len(),
                report.output_dir.display(),
                report.no_match.len(),
                report.failed.len()
            );
            Ok(())
        }
        Command::Extract { file, preview } => {
            let doc = DocxParser::new()
                .parse_file(&file)
                .with_context(|| format!("Failed to extract {}", file.display()))?;
            let text = doc.text();
            match preview {
                Some(n) => println!("{}", text.chars().take(n).collect::<String>()),
                None => println!("{}", text),
            }
            Ok(())
        }
        Command::Summarize { file, out, search } => {
            let doc = DocxParser::new()
                .parse_file(&file)
                .with_context(|| format!("Failed to extract {}", file.display()))?;
            info!(file = %file.display(), words = doc.word_count(), "extracted document");

            let model = ModelCache::new(config.summarizer.clone()).get().await?;
            let pipeline = SummaryPipeline::from_config(&config).with_filter(true, search.as_deref());
            match pipeline.run(model.as_ref(), &doc.text()).await? {
                PipelineOutcome::Summarized { report, .. } => {
                    let out = out.unwrap_or_else(|| file.with_file_name(summary_file_name(&doc.name)));
                    std::fs::write(&out, &report.summary)
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    println!("Summary saved to {}", out.display());
                }
                PipelineOutcome::Halted { halt, .. } => warn!("{}", halt.message()),
            }
            Ok(())
        }
    }
}

async fn serve(config: SogConfig) -> Result<()> {
    let addr = config.server.bind_addr();
    let app = sog_server::app(config);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("Server error")?;
    Ok(())
}
