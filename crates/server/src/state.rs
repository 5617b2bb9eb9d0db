//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use dog_assistant_agent::ExtractionPipeline;
use dog_assistant_catalog::{Catalog, KeywordMatcher, MatchConfig};
use dog_assistant_config::Settings;
use dog_assistant_llm::{OpenAIBackend, OpenAIConfig};

use crate::rate_limit::RateLimiter;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pipeline: Arc<ExtractionPipeline>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State around an already-built pipeline
    pub fn new(settings: Settings, pipeline: ExtractionPipeline) -> Self {
        let rate_limiter = RateLimiter::from_config(&settings.server.rate_limit);
        Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
            rate_limiter: Arc::new(rate_limiter),
            metrics: None,
        }
    }

    /// Build the catalog, model client and pipeline from settings
    ///
    /// A missing catalog is not an error; a model client that cannot be
    /// configured is.
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let catalog = Catalog::load(&settings.catalog.path);

        let backend = OpenAIBackend::new(OpenAIConfig::from(&settings.llm))
            .map_err(|e| ServerError::Configuration(e.to_string()))?;

        let matcher = KeywordMatcher::new(MatchConfig {
            include_description: settings.catalog.matching.include_description,
            max_results: settings.catalog.matching.max_results,
        });

        let pipeline = ExtractionPipeline::new(Arc::new(backend), Arc::new(catalog), matcher);

        tracing::info!(
            model = pipeline.model_name(),
            products = pipeline.catalog().len(),
            include_description = matcher.config().include_description,
            max_results = matcher.config().max_results,
            "Extraction pipeline ready"
        );

        Ok(Self::new(settings, pipeline))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
