use crate::adapters::http::HttpJsonSource;
use crate::config::catalog::load_catalog;
use crate::core::dispatcher::FetchDispatcher;
use crate::core::{AggregateResult, ConfigProvider, DispatchSummary, EndpointCatalog, JsonSource};
use crate::utils::error::Result;
use std::sync::Arc;

/// Pairs the process-wide catalog with a dispatcher.
pub struct FanoutEngine<S: JsonSource> {
    catalog: Arc<EndpointCatalog>,
    dispatcher: FetchDispatcher<S>,
}

impl FanoutEngine<HttpJsonSource> {
    /// Loads the catalog file and builds the HTTP client described by `config`.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        tracing::info!("Loading endpoint catalog from {}", config.catalog_path());
        let catalog = load_catalog(config.catalog_path())?;
        tracing::info!(
            "Catalog ready with {} endpoints: {}",
            catalog.len(),
            catalog.names().collect::<Vec<_>>().join(", ")
        );

        let source = HttpJsonSource::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(catalog), source))
    }
}

impl<S: JsonSource> FanoutEngine<S> {
    pub fn new(catalog: Arc<EndpointCatalog>, source: S) -> Self {
        Self {
            catalog,
            dispatcher: FetchDispatcher::new(source),
        }
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    pub async fn run(&self) -> AggregateResult {
        self.dispatcher.dispatch(&self.catalog).await
    }

    pub async fn run_with_summary(&self) -> (AggregateResult, DispatchSummary) {
        self.dispatcher.dispatch_with_summary(&self.catalog).await
    }
}
