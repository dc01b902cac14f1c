use thiserror::Error;

/// Failure of a single outbound fetch. Always converted into a
/// `FetchOutcome::Failure` by the dispatcher, never surfaced to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {message}")]
    Parse { url: String, message: String },

    #[error("index response from {url} is not a JSON array")]
    UnexpectedShape { url: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_builder() {
            FetchError::InvalidUrl {
                url: url.to_string(),
                message: error_chain(&error),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error_chain(&error),
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::Network { url, .. }
            | FetchError::InvalidUrl { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::UnexpectedShape { url } => url,
        }
    }
}

/// Joins an error and all of its sources into one line.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FanoutError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FanoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FanoutError::SerializationError(_)
            | FanoutError::TomlError(_)
            | FanoutError::ConfigError { .. }
            | FanoutError::MissingConfigError { .. }
            | FanoutError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FanoutError::HttpClientError(_) | FanoutError::ServerError { .. } => {
                ErrorCategory::Network
            }
            FanoutError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FanoutError::IoError(_) => "Check that the catalog file exists and is readable",
            FanoutError::SerializationError(_) => {
                "Check the JSON catalog syntax: each entry needs at least a base_url"
            }
            FanoutError::TomlError(_) => {
                "Check the TOML catalog syntax: one [table] per endpoint with a base_url"
            }
            FanoutError::HttpClientError(_) => "Check the TLS setup and the timeout value",
            FanoutError::ConfigError { .. } | FanoutError::MissingConfigError { .. } => {
                "Review the catalog file and command line flags"
            }
            FanoutError::InvalidConfigValueError { .. } => {
                "Fix the highlighted value and run again"
            }
            FanoutError::ServerError { .. } => {
                "Make sure the bind address is free and you have permission to use it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FanoutError::IoError(e) => format!("Could not read the catalog: {}", e),
            FanoutError::MissingConfigError { field } => {
                format!("The setting '{}' is required but was not provided", field)
            }
            FanoutError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for {}: {}", value, field, reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FanoutError>;
