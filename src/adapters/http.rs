use crate::domain::ports::JsonSource;
use crate::utils::error::{FetchError, FetchResult, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// `JsonSource` backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: Client,
}

impl HttpJsonSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn get_json(
        &self,
        url: &str,
        params: Option<&BTreeMap<String, String>>,
    ) -> FetchResult<serde_json::Value> {
        let mut request = self.client.get(url);
        if let Some(params) = params {
            request = request.query(params);
        }

        tracing::debug!("GET {}", url);
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        tracing::debug!("{} responded with {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
