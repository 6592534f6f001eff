//! Summarization model backends.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sog_core::config::{DecodingParams, ModelBackend, SummarizerConfig};
use sog_core::{Result, SogError};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

/// A pretrained summarization model: text span in, condensed span out.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, params: &DecodingParams) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Construct the configured backend. Called once per process by [`crate::ModelCache`].
pub fn load_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    let model: Arc<dyn Summarizer> = match config.backend {
        ModelBackend::Inference => Arc::new(InferenceSummarizer::from_config(config)?),
        ModelBackend::Lead => Arc::new(LeadSummarizer::new()),
    };
    info!(backend = config.backend.as_str(), model = model.model_name(), "summarization model loaded");
    Ok(model)
}

// ========== Hosted inference ==========

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

impl From<&DecodingParams> for InferenceParameters {
    fn from(p: &DecodingParams) -> Self {
        Self { min_length: p.min_length, max_length: p.max_length, do_sample: p.do_sample }
    }
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Summaries(Vec<SummaryItem>),
    Error { error: String },
}

/// Pretrained model served behind an HTTP summarization endpoint.
pub struct InferenceSummarizer {
    model: String,
    endpoint: reqwest::Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl InferenceSummarizer {
    pub fn from_config(config: &SummarizerConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| SogError::ModelLoad(format!("invalid endpoint {}: {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SogError::ModelLoad(format!("unsupported endpoint scheme: {}", url.scheme())));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SogError::ModelLoad(format!("http client: {}", e)))?;
        Ok(Self {
            model: config.model.clone(),
            endpoint: url,
            token: config.api_token(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl Summarizer for InferenceSummarizer {
    async fn summarize(&self, text: &str, params: &DecodingParams) -> Result<String> {
        let body = InferenceRequest {
            inputs: text,
            parameters: params.into(),
            options: InferenceOptions { wait_for_model: true },
        };
        let mut req = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SogError::Inference(format!("request to {} failed: {}", self.endpoint, e)))?;
        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| SogError::Inference(format!("reading response: {}", e)))?;
        debug!(status = status.as_u16(), bytes = raw.len(), "inference response");

        let parsed: Option<InferenceResponse> = serde_json::from_str(&raw).ok();
        match parsed {
            Some(InferenceResponse::Error { error }) => {
                Err(SogError::Inference(format!("model returned {}: {}", status, error)))
            }
            _ if !status.is_success() => {
                Err(SogError::Inference(format!("model returned {}: {}", status, raw.trim())))
            }
            Some(InferenceResponse::Summaries(items)) => items
                .into_iter()
                .next()
                .map(|item| item.summary_text.trim().to_string())
                .ok_or_else(|| SogError::Inference("model returned no summaries".into())),
            None => Err(SogError::Inference(format!("unexpected response body: {}", raw.trim()))),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ========== Offline extractive ==========

static RE_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?\n]+(?:[.!?]+|\n|$)").unwrap());

/// Extractive model that keeps leading sentences.
///
/// Lengths are counted in whitespace words. Sentences are taken in order
/// until `min_length` is reached, never exceeding `max_length`; a first
/// sentence longer than `max_length` is cut to it.
pub struct LeadSummarizer;

impl LeadSummarizer {
    pub fn new() -> Self { Self }

    pub fn summarize_sync(&self, text: &str, params: &DecodingParams) -> String {
        let mut picked: Vec<&str> = Vec::new();
        let mut words = 0;

        for m in RE_SENTENCE.find_iter(text) {
            let sentence = m.as_str().trim();
            if sentence.is_empty() {
                continue;
            }
            let n = sentence.split_whitespace().count();
            if words + n > params.max_length {
                if picked.is_empty() {
                    return sentence
                        .split_whitespace()
                        .take(params.max_length)
                        .collect::<Vec<_>>()
                        .join(" ");
                }
                break;
            }
            picked.push(sentence);
            words += n;
            if words >= params.min_length {
                break;
            }
        }
        picked.join(" ")
    }
}

impl Default for LeadSummarizer {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Summarizer for LeadSummarizer {
    async fn summarize(&self, text: &str, params: &DecodingParams) -> Result<String> {
        Ok(self.summarize_sync(text, params))
    }

    fn model_name(&self) -> &str {
        "lead"
    }
}
