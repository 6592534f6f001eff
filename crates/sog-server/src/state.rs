//! Application state shared across all handlers.

use sog_core::SogConfig;
use sog_parser::DocxParser;
use sog_summarizer::{ModelCache, Summarizer};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SogConfig>,
    pub model: Arc<ModelCache>,
    pub parser: Arc<DocxParser>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// State whose model loads lazily from `config.summarizer` on first summary.
    pub fn new(config: SogConfig) -> Self {
        let model = ModelCache::new(config.summarizer.clone());
        Self::with_cache(config, model)
    }

    /// State with an already-loaded model.
    pub fn with_model(config: SogConfig, model: Arc<dyn Summarizer>) -> Self {
        Self::with_cache(config, ModelCache::preloaded(model))
    }

    pub fn with_cache(config: SogConfig, model: ModelCache) -> Self {
        Self {
            config: Arc::new(config),
            model: Arc::new(model),
            parser: Arc::new(DocxParser::new()),
            start_time: std::time::Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SogConfig::default())
    }
}
