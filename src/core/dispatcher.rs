use crate::domain::model::{
    AggregateResult, DispatchSummary, EndpointCatalog, EndpointDescriptor, FetchOutcome,
    FetchStrategy, ID_PLACEHOLDER,
};
use crate::domain::ports::JsonSource;
use crate::utils::error::{FetchError, FetchResult};
use futures::future::join_all;
use serde_json::{json, Value};
use std::time::Instant;

/// Fans one request out per catalog entry and gathers every outcome.
///
/// Failures are captured per endpoint (and per item for index+detail
/// endpoints), so `dispatch` always returns exactly one outcome per entry.
pub struct FetchDispatcher<S: JsonSource> {
    source: S,
}

impl<S: JsonSource> FetchDispatcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn dispatch(&self, catalog: &EndpointCatalog) -> AggregateResult {
        self.dispatch_with_summary(catalog).await.0
    }

    pub async fn dispatch_with_summary(
        &self,
        catalog: &EndpointCatalog,
    ) -> (AggregateResult, DispatchSummary) {
        let started = Instant::now();
        tracing::debug!("Dispatching {} endpoint fetches", catalog.len());

        let tasks = catalog.iter().map(|endpoint| async move {
            let outcome = self.fetch_endpoint(endpoint).await;
            (endpoint.name.clone(), outcome)
        });

        let mut result = AggregateResult::default();
        for (name, outcome) in join_all(tasks).await {
            result.insert(name, outcome);
        }

        let summary = result.summary(started.elapsed());
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_ms,
            "Dispatch complete"
        );

        (result, summary)
    }

    async fn fetch_endpoint(&self, endpoint: &EndpointDescriptor) -> FetchOutcome {
        let result = match &endpoint.strategy {
            FetchStrategy::Standard => {
                self.source
                    .get_json(&endpoint.target_url, endpoint.query_params.as_ref())
                    .await
            }
            FetchStrategy::IndexThenDetail {
                detail_template,
                limit,
            } => {
                self.fetch_index_then_detail(endpoint, detail_template, *limit)
                    .await
            }
        };

        if let Err(e) = &result {
            tracing::warn!(endpoint = %endpoint.name, error = %e, "Endpoint fetch failed");
        }
        result.into()
    }

    async fn fetch_index_then_detail(
        &self,
        endpoint: &EndpointDescriptor,
        detail_template: &str,
        limit: usize,
    ) -> FetchResult<Value> {
        let index = self
            .source
            .get_json(&endpoint.target_url, endpoint.query_params.as_ref())
            .await?;

        let Value::Array(ids) = index else {
            return Err(FetchError::UnexpectedShape {
                url: endpoint.target_url.clone(),
            });
        };

        tracing::debug!(
            endpoint = %endpoint.name,
            "Index returned {} ids, following the first {}",
            ids.len(),
            limit.min(ids.len())
        );

        // join_all keeps input order, so placeholders stay at their id's position
        let items = join_all(
            ids.iter()
                .take(limit)
                .map(|id| self.fetch_detail(detail_template, id)),
        )
        .await;

        Ok(Value::Array(items))
    }

    async fn fetch_detail(&self, detail_template: &str, id: &Value) -> Value {
        let id = identifier_text(id);
        let url = detail_url(detail_template, &id);

        match self.source.get_json(&url, None).await {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!("Detail fetch for {} failed: {}", id, e);
                json!({ "error": format!("Failed to fetch story {}", id) })
            }
        }
    }
}

/// Fills the `{id}` placeholder of a detail template.
///
/// The identifier is percent-encoded so it always stays inside one path segment.
pub fn detail_url(detail_template: &str, id: &str) -> String {
    // byte_serialize emits '+' for spaces and escapes a literal '+' as %2B
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    detail_template.replace(ID_PLACEHOLDER, &encoded)
}

fn identifier_text(id: &Value) -> String {
    match id {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
