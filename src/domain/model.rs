use crate::utils::error::{FanoutError, FetchError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// How many identifiers an index+detail endpoint follows.
pub const DEFAULT_DETAIL_LIMIT: usize = 5;

/// Placeholder replaced by an identifier in a detail URL template.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Catalog name that resolves to the index+detail strategy without further configuration.
pub const HACKERNEWS_ENDPOINT: &str = "hackernews";

pub const HACKERNEWS_ITEM_TEMPLATE: &str = "https://hacker-news.firebaseio.com/v0/item/{id}.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One GET, body parsed as JSON.
    Standard,
    /// GET an array of identifiers, then GET up to `limit` detail records.
    IndexThenDetail {
        detail_template: String,
        limit: usize,
    },
}

impl FetchStrategy {
    pub fn index_then_detail(detail_template: impl Into<String>) -> Self {
        FetchStrategy::IndexThenDetail {
            detail_template: detail_template.into(),
            limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: String,
    /// Sent as written; `${VAR}` references are expanded when the catalog file is loaded.
    pub target_url: String,
    pub query_params: Option<BTreeMap<String, String>>,
    pub strategy: FetchStrategy,
}

impl EndpointDescriptor {
    pub fn standard(name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_url: target_url.into(),
            query_params: None,
            strategy: FetchStrategy::Standard,
        }
    }

    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Read-only set of endpoints, ordered by name with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointCatalog {
    endpoints: Vec<EndpointDescriptor>,
}

impl EndpointCatalog {
    pub fn new(mut endpoints: Vec<EndpointDescriptor>) -> Result<Self> {
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(pair) = endpoints.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(FanoutError::InvalidConfigValueError {
                field: "catalog".to_string(),
                value: pair[0].name.clone(),
                reason: "Endpoint names must be unique".to_string(),
            });
        }

        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EndpointDescriptor> {
        self.endpoints
            .binary_search_by(|endpoint| endpoint.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.endpoints[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|endpoint| endpoint.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(serde_json::Value),
    Failure(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(detail) => Some(detail),
        }
    }
}

impl From<std::result::Result<serde_json::Value, FetchError>> for FetchOutcome {
    fn from(result: std::result::Result<serde_json::Value, FetchError>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Success(value),
            Err(error) => FetchOutcome::Failure(error.to_string()),
        }
    }
}

// Success is emitted as the bare payload, Failure as {"error": "..."}
impl Serialize for FetchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FetchOutcome::Success(value) => value.serialize(serializer),
            FetchOutcome::Failure(detail) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", detail)?;
                map.end()
            }
        }
    }
}

/// One outcome per catalog entry, keyed by endpoint name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    outcomes: BTreeMap<String, FetchOutcome>,
}

impl AggregateResult {
    pub(crate) fn insert(&mut self, name: String, outcome: FetchOutcome) {
        self.outcomes.insert(name, outcome);
    }

    pub fn get(&self, name: &str) -> Option<&FetchOutcome> {
        self.outcomes.get(name)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchOutcome)> {
        self.outcomes
            .iter()
            .map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn summary(&self, elapsed: Duration) -> DispatchSummary {
        let succeeded = self.outcomes.values().filter(|o| o.is_success()).count();
        DispatchSummary {
            total: self.outcomes.len(),
            succeeded,
            failed: self.outcomes.len() - succeeded,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_is_sorted_and_searchable() {
        let catalog = EndpointCatalog::new(vec![
            EndpointDescriptor::standard("stackoverflow", "https://api.stackexchange.com/2.3/questions"),
            EndpointDescriptor::standard("github", "https://api.github.com/search/repositories"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["github", "stackoverflow"]);
        assert!(catalog.get("github").is_some());
        assert!(catalog.get("hackernews").is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicate_names() {
        let result = EndpointCatalog::new(vec![
            EndpointDescriptor::standard("github", "https://a.example.com"),
            EndpointDescriptor::standard("github", "https://b.example.com"),
        ]);
        assert!(matches!(
            result,
            Err(FanoutError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_outcome_serialization() {
        let success = FetchOutcome::Success(json!({"items": [1, 2]}));
        let failure = FetchOutcome::Failure("request to x timed out".to_string());

        assert_eq!(serde_json::to_value(&success).unwrap(), json!({"items": [1, 2]}));
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"error": "request to x timed out"})
        );
    }

    #[test]
    fn test_outcome_from_fetch_result() {
        let ok: FetchOutcome = Ok(json!([1])).into();
        assert_eq!(ok.payload(), Some(&json!([1])));

        let err: FetchOutcome = Err(FetchError::Status {
            url: "http://x".to_string(),
            status: 404,
        })
        .into();
        assert!(!err.is_success());
        assert_eq!(err.error(), Some("http://x responded with HTTP 404"));
    }

    #[test]
    fn test_aggregate_serializes_as_object_and_summarizes() {
        let mut result = AggregateResult::default();
        result.insert("github".to_string(), FetchOutcome::Success(json!({"total_count": 3})));
        result.insert("weather".to_string(), FetchOutcome::Failure("boom".to_string()));

        let expected = json!({
            "github": {"total_count": 3},
            "weather": {"error": "boom"}
        });
        assert_eq!(serde_json::to_value(&result).unwrap(), expected);

        let summary = result.summary(Duration::from_millis(42));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.elapsed_ms, 42);
    }
}
