pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, ServerConfig};

pub use crate::adapters::http::HttpJsonSource;
pub use crate::config::catalog::load_catalog;
pub use crate::core::{
    dispatcher::FetchDispatcher, engine::FanoutEngine, AggregateResult, DispatchSummary,
    EndpointCatalog, EndpointDescriptor, FetchOutcome, FetchStrategy,
};
pub use crate::utils::error::{FanoutError, FetchError, Result};
