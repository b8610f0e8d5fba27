pub mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use crate::core::{DeliveryMode, SimulationDataset, SourceId, StateSnapshot};
use crate::error::PlaybackResult;
use async_trait::async_trait;

/// Source id that asks the backend to start a fresh streaming run
pub const FRESH_RUN: SourceId = -1;

/// Steps requested when a streaming run is started
pub const INITIAL_STREAMING_STEPS: usize = 1;

/// Request surface of a simulation backend
///
/// Implementations:
/// - `HttpBackend` talks to the visualization server over HTTP
/// - `MockBackend` serves in-memory plans for tests and offline demos
///
/// Each method maps its failure to the matching `PlaybackError` kind and
/// never retries.
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// List the plans offered for a delivery mode
    async fn list_plans(&self, mode: DeliveryMode) -> PlaybackResult<Vec<String>>;

    /// Fetch the complete dataset of a plan
    async fn fetch_batch_dataset(&self, plan: &str) -> PlaybackResult<SimulationDataset>;

    /// Start a new streaming run; the result carries the surface, the first
    /// `steps` states and the run's `source_id`
    async fn start_streaming_run(&self, plan: &str, steps: usize) -> PlaybackResult<SimulationDataset>;

    /// Continue a streaming run by up to `steps` states; empty means exhausted
    async fn fetch_streaming_chunk(
        &self,
        plan: &str,
        source_id: SourceId,
        steps: usize,
    ) -> PlaybackResult<Vec<StateSnapshot>>;
}
