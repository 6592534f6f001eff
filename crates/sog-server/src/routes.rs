use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sog_core::summary_file_name;
use sog_parser::DocumentParser;
use sog_summarizer::{ChunkedSummarizer, SummaryPipeline};
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/extract", post(extract))
        .route("/api/v1/summarize", post(summarize))
        .route("/api/v1/summary/download", post(download))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "model": state.model.config().model,
        "model_loaded": state.model.status(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub filename: String,
    /// Extracted (and possibly filtered) text; `None` when the filter matched nothing.
    pub text: Option<String>,
    pub word_count: usize,
    pub paragraphs: usize,
    pub search_term: Option<String>,
    pub filtered: bool,
    pub warning: Option<String>,
    pub download_name: String,
}

/// Truthy checkbox values.
fn is_checked(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

/// Multipart fields: `file` (required), `search`, `filter`.
///
/// The search term is applied when `filter` is checked, or when `filter` is
/// omitted and a term is given.
async fn extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut search: Option<String> = None;
    let mut filter: Option<bool> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some((name, bytes.to_vec()));
            }
            "search" => search = Some(field.text().await?),
            "filter" => filter = Some(is_checked(&field.text().await?)),
            _ => {}
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' upload"))?;
    state.parser.ensure_supported(&filename)?;

    let doc = state.parser.parse_bytes(&filename, &bytes)?;
    info!(filename = %filename, paragraphs = doc.paragraph_count(), words = doc.word_count(), "extracted document");

    let pipeline = SummaryPipeline::from_config(&state.config)
        .with_filter(filter.unwrap_or(true), search.as_deref());
    let prepared = pipeline.prepare(&doc.text());
    let filtered = !prepared.stages_applied.is_empty();
    let search_term = if filtered { search } else { None };

    let (text, warning) = match prepared.outcome {
        Ok(text) => (Some(text), None),
        Err(halt) => {
            warn!(filename = %filename, "{}", halt.message());
            (None, Some(halt.message()))
        }
    };

    Ok(Json(ExtractResponse {
        download_name: doc.summary_file_name(),
        word_count: doc.word_count(),
        paragraphs: doc.paragraph_count(),
        filename,
        text,
        search_term,
        filtered,
        warning,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub chunks: usize,
    pub model: String,
    pub download_name: String,
}

async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let model = state.model.get().await?;
    let report = ChunkedSummarizer::from_config(&state.config)
        .summarize(model.as_ref(), &req.text)
        .await?;
    info!(chunks = report.chunks, model = %report.model, "summary generated");

    Ok(Json(SummarizeResponse {
        summary: report.summary,
        chunks: report.chunks,
        model: report.model,
        download_name: summary_file_name(req.filename.as_deref().unwrap_or_default()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub summary: String,
    pub filename: Option<String>,
}

async fn download(Json(req): Json<DownloadRequest>) -> impl IntoResponse {
    let name = summary_file_name(req.filename.as_deref().unwrap_or_default()).replace('"', "_");
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name)),
        ],
        req.summary,
    )
}
