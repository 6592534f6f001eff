use crate::*;
use crate::state::AppState;
use crate::routes::{ExtractResponse, SummarizeResponse};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sog_core::config::DecodingParams;
use sog_core::{Result, SogConfig, SogError};
use sog_summarizer::{LeadSummarizer, ModelCache, Summarizer};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "sog-test-boundary";

#[derive(Default)]
struct RecordingModel {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for RecordingModel {
    async fn summarize(&self, text: &str, _params: &DecodingParams) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(text.to_string());
        Ok(format!("summary {}", calls.len()))
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};
    let mut docx = Docx::new();
    for p in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
    }
    let mut buf = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

fn multipart_body(filename: &str, bytes: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn extract_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/extract")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn recording_state() -> (AppState, Arc<RecordingModel>) {
    let model = Arc::new(RecordingModel::default());
    (AppState::with_model(SogConfig::default(), model.clone()), model)
}

fn broken_model_state() -> AppState {
    let cache = ModelCache::with_loader(Default::default(), |_| {
        Err(SogError::ModelLoad("checkpoint download failed".into()))
    });
    AppState::with_cache(SogConfig::default(), cache)
}

// ========== Page + health ==========

#[tokio::test]
async fn test_index_page() {
    let app = app_with_state(AppState::default());
    let resp = app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("SOG Summarizer"));
    assert!(html.contains("accept=\".docx\""));
}

#[tokio::test]
async fn test_health_before_model_load() {
    let app = app_with_state(AppState::default());
    let resp = app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], Value::Null);
}

// ========== Extract ==========

#[tokio::test]
async fn test_extract_docx() {
    let app = app_with_state(AppState::default());
    let docx = docx_bytes(&["Size-up the scene", "", "Establish command"]);
    let resp = app.oneshot(extract_request(multipart_body("AFR_SOG.docx", &docx, &[]))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ExtractResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.filename, "AFR_SOG.docx");
    assert_eq!(body.text.as_deref(), Some("Size-up the scene\nEstablish command"));
    assert_eq!(body.word_count, 5);
    assert_eq!(body.paragraphs, 2);
    assert!(!body.filtered);
    assert!(body.warning.is_none());
    assert_eq!(body.download_name, "AFR_SOG_summary.txt");
}

#[tokio::test]
async fn test_extract_with_filter() {
    let app = app_with_state(AppState::default());
    let docx = docx_bytes(&["Engine 1 lays a supply line", "Truck 2 throws ladders", "ENGINE 3 backs up"]);
    let body = multipart_body("ops.docx", &docx, &[("filter", "on"), ("search", "engine")]);
    let resp = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ExtractResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(body.filtered);
    assert_eq!(body.search_term.as_deref(), Some("engine"));
    assert_eq!(body.text.as_deref(), Some("Engine 1 lays a supply line\nENGINE 3 backs up"));
}

#[tokio::test]
async fn test_extract_filter_unchecked_ignores_term() {
    let app = app_with_state(AppState::default());
    let docx = docx_bytes(&["Engine 1", "Truck 2"]);
    let body = multipart_body("ops.docx", &docx, &[("filter", "off"), ("search", "engine")]);
    let resp = app.oneshot(extract_request(body)).await.unwrap();

    let body: ExtractResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(!body.filtered);
    assert!(body.search_term.is_none());
    assert_eq!(body.text.as_deref(), Some("Engine 1\nTruck 2"));
}

#[tokio::test]
async fn test_extract_no_match_is_warning() {
    let app = app_with_state(AppState::default());
    let docx = docx_bytes(&["Engine 1", "Truck 2"]);
    let body = multipart_body("ops.docx", &docx, &[("filter", "on"), ("search", "hazmat")]);
    let resp = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ExtractResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(body.text.is_none());
    assert_eq!(body.warning.as_deref(), Some("No content found containing 'hazmat'"));
}

#[tokio::test]
async fn test_extract_rejects_non_docx() {
    let app = app_with_state(AppState::default());
    let resp = app.oneshot(extract_request(multipart_body("notes.txt", b"hello", &[]))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(body["error"]["message"], "Invalid input: Please upload a DOCX file (got 'notes.txt')");
}

#[tokio::test]
async fn test_extract_search_term_is_not_trimmed() {
    let app = app_with_state(AppState::default());
    let docx = docx_bytes(&["Engine 4 on scene", "Ladder 2 staging", "Engine house"]);
    let body = multipart_body("ops.docx", &docx, &[("filter", "on"), ("search", " on ")]);
    let resp = app.oneshot(extract_request(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ExtractResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(body.search_term.as_deref(), Some(" on "));
    assert_eq!(body.text.as_deref(), Some("Engine 4 on scene"));
}

#[tokio::test]
async fn test_extract_malformed_docx() {
    let app = app_with_state(AppState::default());
    let resp = app.oneshot(extract_request(multipart_body("bad.docx", b"not a zip", &[]))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_extract_missing_file() {
    let app = app_with_state(AppState::default());
    let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"search\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n");
    let resp = app.oneshot(extract_request(body.into_bytes())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ========== Summarize ==========

#[tokio::test]
async fn test_summarize_chunks_in_order() {
    let (state, model) = recording_state();
    let app = app_with_state(state);
    let text = "b".repeat(1500);
    let resp = app
        .oneshot(json_request("/api/v1/summarize", json!({ "text": text, "filename": "ops.docx" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: SummarizeResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.summary, "summary 1\n\nsummary 2");
    assert_eq!(body.chunks, 2);
    assert_eq!(body.model, "recording");
    assert_eq!(body.download_name, "ops_summary.txt");
    let calls = model.calls.lock().unwrap();
    assert_eq!(calls[0].len(), 1024);
    assert_eq!(calls[1].len(), 476);
}

#[tokio::test]
async fn test_summarize_empty_text() {
    let (state, model) = recording_state();
    let app = app_with_state(state);
    let resp = app.oneshot(json_request("/api/v1/summarize", json!({ "text": "" }))).await.unwrap();
    let body: SummarizeResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.summary, "No text to summarize.");
    assert_eq!(body.chunks, 0);
    assert!(model.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_summarize_with_lead_backend() {
    let state = AppState::with_model(SogConfig::default(), Arc::new(LeadSummarizer::new()));
    let app = app_with_state(state);
    let resp = app
        .oneshot(json_request("/api/v1/summarize", json!({ "text": "Establish command. Then size-up." })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["summary"], "Establish command. Then size-up.");
    assert_eq!(body["download_name"], "document_summary.txt");
}

#[tokio::test]
async fn test_model_load_failure_keeps_extract_available() {
    let state = broken_model_state();

    let resp = app_with_state(state.clone())
        .oneshot(json_request("/api/v1/summarize", json!({ "text": "anything" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "model_unavailable");
    let msg = body["error"]["message"].as_str().unwrap();
    assert!(msg.starts_with("Error loading model: checkpoint download failed"));
    assert!(msg.contains("contact the administrator"));

    let docx = docx_bytes(&["Still extractable"]);
    let resp = app_with_state(state.clone())
        .oneshot(extract_request(multipart_body("ok.docx", &docx, &[])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app_with_state(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["model_loaded"], false);
}

struct FailingModel;

#[async_trait]
impl Summarizer for FailingModel {
    async fn summarize(&self, _text: &str, _params: &DecodingParams) -> Result<String> {
        Err(SogError::Inference("CUDA out of memory".into()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn test_inference_failure_is_bad_gateway() {
    let app = app_with_state(AppState::with_model(SogConfig::default(), Arc::new(FailingModel)));
    let resp = app.oneshot(json_request("/api/v1/summarize", json!({ "text": "x" }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["error"]["code"], "inference_failed");
}

// ========== Download ==========

#[tokio::test]
async fn test_download_summary() {
    let app = app_with_state(AppState::default());
    let resp = app
        .oneshot(json_request(
            "/api/v1/summary/download",
            json!({ "summary": "Crews respond.\n\nCommand established.", "filename": "AFR_SOG.v3.docx" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"AFR_SOG_summary.txt\""
    );
    let body = String::from_utf8(body_bytes(resp).await).unwrap();
    assert_eq!(body, "Crews respond.\n\nCommand established.");
}
