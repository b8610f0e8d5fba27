use crate::backend::{PlaybackBackend, INITIAL_STREAMING_STEPS};
use crate::connector::{LoadedDataset, PlaybackCursor, PlaybackDataConnector};
use crate::core::{DeliveryMode, SourceId, StateSnapshot, SurfaceDescription};
use crate::error::{PlaybackError, PlaybackResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Connector over a simulator run that is fetched as playback consumes it
///
/// Past states are never discarded, so moving backward is always local and
/// stops at the first state. Moving forward past the loaded states asks the
/// backend for exactly the missing number of states. Once the simulator
/// reports no more states, or a fetch fails, the connector stops fetching and
/// forward movement stops at the last loaded state.
pub struct StreamingDataConnector {
    plan: String,
    backend: Arc<dyn PlaybackBackend>,
    loaded: Option<LoadedDataset>,
    source_id: SourceId,
    simulator_exhausted: bool,
}

impl StreamingDataConnector {
    pub fn new(plan: &str, backend: Arc<dyn PlaybackBackend>) -> Self {
        Self {
            plan: plan.to_string(),
            backend,
            loaded: None,
            source_id: crate::backend::FRESH_RUN,
            simulator_exhausted: false,
        }
    }

    pub async fn list_available_plans(backend: &dyn PlaybackBackend) -> PlaybackResult<Vec<String>> {
        backend.list_plans(DeliveryMode::Streaming).await
    }

    /// Whether the backend will no longer be asked for states
    pub fn simulator_exhausted(&self) -> bool {
        self.simulator_exhausted
    }

    /// Server-side run this connector continues
    pub fn source_id(&self) -> Option<SourceId> {
        self.loaded.as_ref().map(|_| self.source_id)
    }

    pub fn loaded_size(&self) -> usize {
        self.loaded.as_ref().map_or(0, |l| l.dataset.len())
    }
}

#[async_trait]
impl PlaybackDataConnector for StreamingDataConnector {
    fn plan(&self) -> &str {
        &self.plan
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Streaming
    }

    fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    fn cursor(&self) -> Option<PlaybackCursor> {
        self.loaded.as_ref().map(|l| l.cursor)
    }

    fn at_end(&self) -> bool {
        self.simulator_exhausted && self.loaded.as_ref().is_some_and(|l| l.cursor.is_at_last())
    }

    async fn initialize(&mut self) -> PlaybackResult<()> {
        let dataset = self
            .backend
            .start_streaming_run(&self.plan, INITIAL_STREAMING_STEPS)
            .await?;
        let source_id = dataset.source_id.ok_or_else(|| {
            PlaybackError::DatasetLoadFailed(format!("No simulator id for plan {}", self.plan))
        })?;
        let loaded = LoadedDataset::new(&self.plan, dataset)?;

        info!(
            "Started streaming run {} for plan {} with {} states",
            source_id,
            self.plan,
            loaded.dataset.len()
        );
        self.source_id = source_id;
        self.simulator_exhausted = false;
        self.loaded = Some(loaded);
        Ok(())
    }

    async fn advance(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot> {
        let loaded = self.loaded.as_mut().ok_or(PlaybackError::ConnectorNotReady)?;
        let remaining = loaded.cursor.remaining();

        if self.simulator_exhausted || step_size <= remaining {
            loaded.cursor.clamp_forward(step_size);
            debug!("Advanced {} to state {} locally", step_size, loaded.cursor.index());
            return Ok(loaded.current().clone());
        }

        let need = step_size - remaining;
        debug!("Fetching {} states from run {}", need, self.source_id);
        let states = match self
            .backend
            .fetch_streaming_chunk(&self.plan, self.source_id, need)
            .await
        {
            Ok(states) => states,
            Err(e) => {
                warn!("Streaming run {} stopped: {}", self.source_id, e);
                self.simulator_exhausted = true;
                return Err(e);
            }
        };

        if states.is_empty() {
            info!("Streaming run {} has no more states", self.source_id);
            self.simulator_exhausted = true;
        } else if states.len() < need {
            debug!("Run {} returned {} of {} requested states", self.source_id, states.len(), need);
        }

        loaded.append(states);
        loaded.cursor.seek_last();
        Ok(loaded.current().clone())
    }

    async fn retreat(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot> {
        let loaded = self.loaded.as_mut().ok_or(PlaybackError::ConnectorNotReady)?;
        loaded.cursor.clamp_backward(step_size);
        debug!("Retreated {} to state {}", step_size, loaded.cursor.index());
        Ok(loaded.current().clone())
    }

    fn current_state(&self) -> PlaybackResult<&StateSnapshot> {
        Ok(self.loaded.as_ref().ok_or(PlaybackError::ConnectorNotReady)?.current())
    }

    fn surface_data(&self) -> PlaybackResult<&SurfaceDescription> {
        self.loaded
            .as_ref()
            .map(|l| &l.dataset.surface)
            .ok_or(PlaybackError::SurfaceDataNotReady)
    }
}
