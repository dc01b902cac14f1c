use crate::utils::error::FetchResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Outbound seam: GET a URL and hand back its body as JSON.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(
        &self,
        url: &str,
        params: Option<&BTreeMap<String, String>>,
    ) -> FetchResult<serde_json::Value>;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_path(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}
