use crate::backend::PlaybackBackend;
use crate::connector::{LoadedDataset, PlaybackCursor, PlaybackDataConnector};
use crate::core::{DeliveryMode, StateSnapshot, SurfaceDescription};
use crate::error::{PlaybackError, PlaybackResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Connector over a plan fetched whole, up front
///
/// The timeline is cyclic: stepping past the last state returns to the first
/// and stepping before the first returns to the last. Navigation never
/// touches the backend.
pub struct BatchDataConnector {
    plan: String,
    backend: Arc<dyn PlaybackBackend>,
    loaded: Option<LoadedDataset>,
}

impl BatchDataConnector {
    pub fn new(plan: &str, backend: Arc<dyn PlaybackBackend>) -> Self {
        Self {
            plan: plan.to_string(),
            backend,
            loaded: None,
        }
    }

    pub async fn list_available_plans(backend: &dyn PlaybackBackend) -> PlaybackResult<Vec<String>> {
        backend.list_plans(DeliveryMode::Batch).await
    }

    fn loaded_mut(&mut self) -> PlaybackResult<&mut LoadedDataset> {
        self.loaded.as_mut().ok_or(PlaybackError::ConnectorNotReady)
    }
}

#[async_trait]
impl PlaybackDataConnector for BatchDataConnector {
    fn plan(&self) -> &str {
        &self.plan
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Batch
    }

    fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    fn cursor(&self) -> Option<PlaybackCursor> {
        self.loaded.as_ref().map(|l| l.cursor)
    }

    fn at_end(&self) -> bool {
        false
    }

    async fn initialize(&mut self) -> PlaybackResult<()> {
        let dataset = self.backend.fetch_batch_dataset(&self.plan).await?;
        let loaded = LoadedDataset::new(&self.plan, dataset)?;
        info!("Loaded batch plan {} with {} states", self.plan, loaded.dataset.len());
        self.loaded = Some(loaded);
        Ok(())
    }

    async fn advance(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot> {
        let loaded = self.loaded_mut()?;
        loaded.cursor.wrap_forward(step_size);
        debug!("Advanced {} to state {}", step_size, loaded.cursor.index());
        Ok(loaded.current().clone())
    }

    async fn retreat(&mut self, step_size: usize) -> PlaybackResult<StateSnapshot> {
        let loaded = self.loaded_mut()?;
        loaded.cursor.wrap_backward(step_size);
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
