use crate::error::{Result, SogError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const DEFAULT_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SogConfig {
    pub summarizer: SummarizerConfig,
    pub chunking: ChunkingConfig,
    pub decoding: DecodingParams,
    pub server: ServerConfig,
    pub batch: BatchConfig,
}

/// Which model implementation backs the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Hosted pretrained model reached over HTTP.
    Inference,
    /// Offline extractive model that keeps leading sentences.
    Lead,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inference => "inference",
            Self::Lead => "lead",
        }
    }
}

impl std::str::FromStr for ModelBackend {
    type Err = SogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inference" => Ok(Self::Inference),
            "lead" => Ok(Self::Lead),
            other => Err(SogError::Config(format!("unknown model backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub backend: ModelBackend,
    pub model: String,
    /// Full inference URL. Derived from `model` when unset.
    pub endpoint: Option<String>,
    /// Environment variable holding an optional bearer token.
    pub api_token_env: String,
    pub timeout_secs: u64,
}

impl SummarizerConfig {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!("{}/{}", DEFAULT_INFERENCE_BASE, self.model),
        }
    }

    /// Token read from `api_token_env`, ignoring blank values.
    pub fn api_token(&self) -> Option<String> {
        std::env::var(&self.api_token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Inference,
            model: DEFAULT_MODEL.into(),
            endpoint: None,
            api_token_env: "HF_TOKEN".into(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chunk_chars: 1024 }
    }
}

/// Fixed decoding parameters sent with every model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingParams {
    /// Minimum summary length in tokens.
    pub min_length: usize,
    /// Maximum summary length in tokens.
    pub max_length: usize,
    pub do_sample: bool,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self { min_length: 40, max_length: 150, do_sample: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8501, max_upload_bytes: 200 * 1024 * 1024 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Output directory, resolved against the input directory unless absolute.
    pub output_subdir: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { output_subdir: "summaries".into() }
    }
}

impl SogConfig {
    /// Load a JSON config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: SogConfig = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_chars == 0 {
            return Err(SogError::Config("chunking.max_chunk_chars must be greater than 0".into()));
        }
        if self.decoding.max_length == 0 {
            return Err(SogError::Config("decoding.max_length must be greater than 0".into()));
        }
        if self.decoding.min_length > self.decoding.max_length {
            return Err(SogError::Config(format!(
                "decoding.min_length ({}) exceeds decoding.max_length ({})",
                self.decoding.min_length, self.decoding.max_length
            )));
        }
        if self.summarizer.model.trim().is_empty() {
            return Err(SogError::Config("summarizer.model must not be empty".into()));
        }
        Ok(())
    }
}
