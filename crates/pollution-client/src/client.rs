//! reqwest implementation of the pollution services.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use viewer_common::{GeoBounds, SelectionTuple, TimeInfo, ViewerError, ViewerResult};

use crate::service::PollutionService;
use crate::types::{BoundsPayload, SwitchRequest, TimePayload};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Typed client for every collaborator endpoint.
pub struct PollutionClient {
    pub(crate) http: Client,
    pub(crate) base: String,
}

impl PollutionClient {
    /// Build a client with explicit timeouts.
    pub fn new(config: ClientConfig) -> ViewerResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ViewerError::http)?;

        Ok(Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Reject non-2xx responses, carrying the body as the message.
    pub(crate) async fn check_status(response: Response) -> ViewerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ViewerError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ViewerResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ViewerError::http)?;

        Self::check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ViewerError::Decode(e.to_string()))
    }

    /// Raw point data for a slice, as a GeoJSON FeatureCollection.
    pub async fn point_data(
        &self,
        time_index: u32,
        level_index: u32,
        species: &str,
    ) -> ViewerResult<serde_json::Value> {
        let url = format!(
            "{}/pollution/points?time_index={}&level_index={}&species={}",
            self.base, time_index, level_index, species
        );
        self.get_json(&url).await
    }
}

#[async_trait]
impl PollutionService for PollutionClient {
    async fn geo_bounds(&self) -> ViewerResult<GeoBounds> {
        let payload: BoundsPayload = self.get_json(&self.url("/pollution/bounds")).await?;
        Ok(payload.into())
    }

    async fn species(&self) -> ViewerResult<Vec<String>> {
        self.get_json(&self.url("/pollution/species")).await
    }

    async fn data_types(&self) -> ViewerResult<Vec<String>> {
        self.get_json(&self.url("/pollution/data_types")).await
    }

    async fn time_info(&self, time_index: u32) -> ViewerResult<TimeInfo> {
        let url = format!("{}/pollution/time?time_index={}", self.base, time_index);
        let payload: TimePayload = self.get_json(&url).await?;
        Ok(payload.into())
    }

    fn image_url(&self, tuple: &SelectionTuple) -> String {
        format!(
            "{}/pollution/image?time_index={}&level_index={}&species={}&data_type={}&dataset={}",
            self.base,
            tuple.time_index,
            tuple.level_index,
            tuple.species,
            tuple.data_type,
            tuple.dataset
        )
    }

    async fn fetch_image(&self, tuple: &SelectionTuple) -> ViewerResult<Bytes> {
        let url = self.image_url(tuple);
        debug!(url = %url, "Fetching overlay image");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ViewerError::http)?;

        Self::check_status(response)
            .await?
            .bytes()
            .await
            .map_err(ViewerError::http)
    }

    async fn datasets(&self) -> ViewerResult<Vec<String>> {
        self.get_json(&self.url("/pollution/datasets")).await
    }

    async fn switch_dataset(&self, dataset: &str) -> ViewerResult<()> {
        let response = self
            .http
            .post(self.url("/pollution/datasets/active"))
            .json(&SwitchRequest { dataset })
            .send()
            .await
            .map_err(ViewerError::http)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            Err(ViewerError::SwitchRejected {
                dataset: dataset.to_string(),
                message,
            })
        } else {
            Err(ViewerError::Backend {
                status: status.as_u16(),
                message,
            })
        }
    }
}
