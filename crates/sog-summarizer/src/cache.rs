//! Process-wide summarization model handle.

use crate::model::{load_summarizer, Summarizer};
use sog_core::config::SummarizerConfig;
use sog_core::{Result, SogError};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::error;

type Loader = dyn Fn(&SummarizerConfig) -> Result<Arc<dyn Summarizer>> + Send + Sync;

/// Lazily loads the model on first use and hands out the same handle afterwards.
///
/// A failed load is remembered: the model stays unavailable for the life of
/// the cache and is not reloaded.
pub struct ModelCache {
    config: SummarizerConfig,
    loader: Box<Loader>,
    cell: OnceCell<std::result::Result<Arc<dyn Summarizer>, String>>,
}

impl ModelCache {
    pub fn new(config: SummarizerConfig) -> Self {
        Self::with_loader(config, load_summarizer)
    }

    pub fn with_loader<F>(config: SummarizerConfig, loader: F) -> Self
    where
        F: Fn(&SummarizerConfig) -> Result<Arc<dyn Summarizer>> + Send + Sync + 'static,
    {
        Self { config, loader: Box::new(loader), cell: OnceCell::new() }
    }

    /// A cache that already holds `model`.
    pub fn preloaded(model: Arc<dyn Summarizer>) -> Self {
        let config = SummarizerConfig { model: model.model_name().to_string(), ..Default::default() };
        Self {
            config,
            loader: Box::new(load_summarizer),
            cell: OnceCell::new_with(Some(Ok(model))),
        }
    }

    /// The loaded model, loading it on first call.
    pub async fn get(&self) -> Result<Arc<dyn Summarizer>> {
        let slot = self
            .cell
            .get_or_init(|| async {
                (self.loader)(&self.config).map_err(|e| {
                    error!(model = %self.config.model, error = %e, "failed to load summarization model");
                    match e {
                        SogError::ModelLoad(msg) => msg,
                        other => other.to_string(),
                    }
                })
            })
            .await;
        match slot {
            Ok(model) => Ok(Arc::clone(model)),
            Err(msg) => Err(SogError::ModelLoad(msg.clone())),
        }
    }

    /// `Some(true)` once loaded, `Some(false)` if loading failed, `None` before first use.
    pub fn status(&self) -> Option<bool> {
        self.cell.get().map(|slot| slot.is_ok())
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }
}
