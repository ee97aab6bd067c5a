//! # Metadata Service Adapter
//!
//! JSON over HTTP. `/version` is long-polled: the service holds the request
//! until the version differs from `value` or `maxWait` seconds pass, so the
//! request timeout for that call is stretched by `max_wait`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::trace;

use ha_01_reaper::MetadataSource;
use shared_types::{MetadataContainer, MetadataError, SelfHost};

/// Metadata service client.
pub struct HttpMetadataClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpMetadataClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| MetadataError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, MetadataError> {
        let url = format!("{}{}", self.base_url, path);
        trace!(url = %url, "reaper: Metadata request");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| MetadataError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MetadataError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataClient {
    async fn get_self_host(&self) -> Result<SelfHost, MetadataError> {
        self.get_json("/self/host", &[], self.request_timeout).await
    }

    async fn get_containers(&self) -> Result<Vec<MetadataContainer>, MetadataError> {
        self.get_json("/containers", &[], self.request_timeout).await
    }

    async fn wait_for_version(
        &self,
        current: &str,
        max_wait: Duration,
    ) -> Result<String, MetadataError> {
        let query = [
            ("wait", "true".to_string()),
            ("value", current.to_string()),
            ("maxWait", max_wait.as_secs().to_string()),
        ];
        self.get_json("/version", &query, max_wait + self.request_timeout)
            .await
    }
}
