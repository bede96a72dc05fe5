//! Shared application state.

use crate::config::Config;
use procura_core::{FallbackEngine, IntakeWorkflow, RecommendationEngine, ResultsStack};
use std::sync::Arc;

/// State shared across all request handlers.
pub struct AppState {
    pub intake: IntakeWorkflow,
    pub results: ResultsStack,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, Arc::new(FallbackEngine))
    }

    /// Build state around a specific recommendation engine.
    pub fn with_engine(config: Config, engine: Arc<dyn RecommendationEngine>) -> Self {
        Self {
            intake: IntakeWorkflow::new(config.intake_ttl(), engine),
            results: ResultsStack::new(config.kiba_ttl()),
            config,
        }
    }
}
