use crate::adapters::http::DEFAULT_TIMEOUT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_CATALOG_PATH: &str = "api_catalog/api.json";

#[derive(Debug, Clone, Parser)]
#[command(name = "api-fanout")]
#[command(about = "Fetch every endpoint in a catalog concurrently and print the combined JSON")]
pub struct CliConfig {
    /// Catalog file (.json or .toml)
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Pretty-print the aggregate JSON
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fanout-server")]
#[command(about = "Serve the combined JSON of every catalog endpoint over HTTP")]
pub struct ServerConfig {
    /// Catalog file (.json or .toml)
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Allowed CORS origin; repeat for several. Any origin is allowed when omitted
    #[arg(long = "allow-origin")]
    pub allow_origins: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ConfigProvider for ServerConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("catalog", &self.catalog)?;
        validate_positive_number("timeout_secs", self.timeout_secs, 1)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("catalog", &self.catalog)?;
        validate_non_empty_string("bind", &self.bind)?;
        validate_positive_number("timeout_secs", self.timeout_secs, 1)
    }
}
