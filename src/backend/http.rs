use crate::backend::{PlaybackBackend, FRESH_RUN, INITIAL_STREAMING_STEPS};
use crate::core::{DeliveryMode, SimulationDataset, SourceId, StateSnapshot};
use crate::error::{PlaybackError, PlaybackResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Backend reached over HTTP
///
/// Endpoints, relative to the base URL:
/// - `GET /plans/{mode}`
/// - `GET /data/batch?plan=P`
/// - `GET /data/streaming?plan=P&steps=N&id=ID`
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn plans_request(&self, mode: DeliveryMode) -> RequestBuilder {
        self.client.get(format!("{}/plans/{}", self.base_url, mode))
    }

    fn batch_request(&self, plan: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/data/batch", self.base_url))
            .query(&[("plan", plan)])
    }

    fn streaming_request(&self, plan: &str, source_id: SourceId, steps: usize) -> RequestBuilder {
        self.client
            .get(format!("{}/data/streaming", self.base_url))
            .query(&[
                ("plan", plan.to_string()),
                ("steps", steps.to_string()),
                ("id", source_id.to_string()),
            ])
    }

    /// Send a request and decode its JSON body
    ///
    /// A non-success response yields its body text as the error message, so
    /// the server's own explanation reaches the user.
    async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, String> {
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Backend responded with {}: {}", status, body);
            return Err(if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            });
        }

        // The server sends JSON with a text content type, so decode the body directly
        let body = response.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&body).map_err(|e| format!("Malformed response: {}", e))
    }
}

#[async_trait]
impl PlaybackBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn list_plans(&self, mode: DeliveryMode) -> PlaybackResult<Vec<String>> {
        debug!("Listing {} plans from {}", mode, self.base_url);
        Self::get_json(self.plans_request(mode))
            .await
            .map_err(PlaybackError::PlanListUnavailable)
    }

    async fn fetch_batch_dataset(&self, plan: &str) -> PlaybackResult<SimulationDataset> {
        debug!("Fetching batch dataset for plan {}", plan);
        Self::get_json(self.batch_request(plan))
            .await
            .map_err(PlaybackError::DatasetLoadFailed)
    }

    async fn start_streaming_run(&self, plan: &str, steps: usize) -> PlaybackResult<SimulationDataset> {
        debug!("Starting streaming run for plan {}", plan);
        let steps = steps.max(INITIAL_STREAMING_STEPS);
        let dataset: SimulationDataset = Self::get_json(self.streaming_request(plan, FRESH_RUN, steps))
            .await
            .map_err(PlaybackError::DatasetLoadFailed)?;

        if dataset.source_id.is_none() {
            return Err(PlaybackError::DatasetLoadFailed(
                "Streaming response carries no simulatorId".to_string(),
            ));
        }
        Ok(dataset)
    }

    async fn fetch_streaming_chunk(
        &self,
        plan: &str,
        source_id: SourceId,
        steps: usize,
    ) -> PlaybackResult<Vec<StateSnapshot>> {
        debug!("Requesting {} states from run {} of plan {}", steps, source_id, plan);
        Self::get_json(self.streaming_request(plan, source_id, steps))
            .await
            .map_err(PlaybackError::StreamingFetchFailed)
    }
}
